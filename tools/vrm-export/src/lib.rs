//! vrm-export library
//!
//! Manifest parsing and stream packing, shared by the `vrm-export` binary and
//! its integration tests.

pub mod manifest;
pub mod stream;

pub use manifest::{Manifest, OutputConfig, StreamEntry, load_manifest, validate};
pub use stream::{PackReport, StreamReport, pack_manifest, write_glb};
