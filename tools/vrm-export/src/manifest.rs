//! Manifest parsing and validation
//!
//! Parses streams.toml: an output section plus one entry per raw attribute
//! stream to pack.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vrm_glb::{AccessorShape, ComponentType, check_stride};

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    /// Streams keyed by name; packed in name order
    #[serde(default)]
    pub streams: BTreeMap<String, StreamEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default = "default_generator")]
    pub generator: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            generator: default_generator(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("out.glb")
}

fn default_generator() -> String {
    format!("vrm-export {}", env!("CARGO_PKG_VERSION"))
}

fn default_component() -> String {
    "FLOAT".to_string()
}

/// One raw little-endian attribute stream
#[derive(Debug, Deserialize)]
pub struct StreamEntry {
    pub path: PathBuf,
    #[serde(default = "default_component")]
    pub component: String,
    pub shape: String,
    /// Bytes between elements; defaults to the packed element size
    #[serde(default)]
    pub stride: Option<usize>,
    /// Let the encoder choose sparse for float VEC3 data
    #[serde(default)]
    pub sparse: bool,
    /// Record per-component min/max (float streams only)
    #[serde(default)]
    pub bounds: bool,
}

impl StreamEntry {
    pub fn component_type(&self) -> Result<ComponentType> {
        Ok(self.component.parse()?)
    }

    pub fn shape(&self) -> Result<AccessorShape> {
        Ok(self.shape.parse()?)
    }

    pub fn element_size(&self) -> Result<usize> {
        Ok(self.component_type()?.size() * self.shape()?.component_count())
    }

    pub fn stride(&self) -> Result<usize> {
        let element_size = self.element_size()?;
        Ok(self.stride.unwrap_or(element_size))
    }
}

/// Load and parse a manifest file
///
/// Relative stream paths are resolved against the manifest's directory.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for entry in manifest.streams.values_mut() {
        if entry.path.is_relative() {
            entry.path = base.join(&entry.path);
        }
    }
    if manifest.output.path.is_relative() {
        manifest.output.path = base.join(&manifest.output.path);
    }
    Ok(manifest)
}

/// Validate a manifest without packing
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.streams.is_empty() {
        anyhow::bail!("Manifest declares no streams");
    }
    for (name, entry) in &manifest.streams {
        entry
            .component_type()
            .with_context(|| format!("Stream '{}'", name))?;
        entry.shape().with_context(|| format!("Stream '{}'", name))?;

        let stride = entry.stride()?;
        check_stride(stride, entry.element_size()?)
            .with_context(|| format!("Stream '{}'", name))?;

        let len = std::fs::metadata(&entry.path)
            .with_context(|| format!("Stream '{}' source not found: {:?}", name, entry.path))?
            .len() as usize;
        if len % stride != 0 {
            anyhow::bail!(
                "Stream '{}' is {} bytes, not a multiple of its {}-byte stride",
                name,
                len,
                stride
            );
        }
    }
    Ok(())
}
