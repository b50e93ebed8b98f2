//! glTF buffer/accessor encoding for VRM avatar export
//!
//! This library packs typed vertex/animation streams into glTF binary
//! buffers:
//! - ExportSession: binary blobs, buffer views and the ordered accessor list
//! - TypedBuffer: read-only strided view over caller-owned element bytes
//! - Accessor encoder: dense views, or sparse-only accessors for mostly-zero
//!   float VEC3 streams such as morph target deltas
//! - MeshExporter: base attributes plus morph targets
//! - GLB assembly of the finished session
//!
//! # Example
//!
//! ```no_run
//! use vrm_glb::*;
//!
//! let mut session = ExportSession::new();
//! let mut deltas = vec![[0.0f32; 3]; 1000];
//! deltas[12] = [0.0, 0.01, 0.0];
//!
//! let accessor = session.add_accessor(
//!     &TypedBuffer::from_vec3(&deltas),
//!     AccessorTarget::sparse(0),
//!     None,
//!     None,
//! )?;
//! assert!(session.accessor(accessor).unwrap().is_sparse());
//!
//! let glb_bytes = session.to_glb("vrm-glb")?;
//! # Ok::<(), vrm_glb::ExportError>(())
//! ```

pub mod accessor;
pub mod bounds;
pub mod document;
pub mod encoder;
pub mod error;
pub mod mesh;
mod scratch;
pub mod session;
pub mod typed_buffer;
pub mod types;
pub mod utils;

pub use accessor::{
    Accessor, AccessorIndex, AccessorSource, Sparse, SparseIndices, SparseValues, ViewIndex,
};
pub use bounds::{compute_bounds, float_min_max};
pub use document::GltfDocument;
pub use encoder::{AccessorTarget, MinMaxFn, is_sparse_eligible, sparse_is_smaller};
pub use error::{ExportError, Result};
pub use mesh::{MeshAccessors, MeshExporter, MorphTarget, MorphTargetAccessors};
pub use session::{BinaryBlob, BufferView, ExportSession};
pub use typed_buffer::{TypedBuffer, check_stride};
pub use types::{AccessorShape, ComponentType, component_count};
pub use utils::{align_buffer, assemble_glb};
