//! glTF JSON document and GLB output for an export session

use serde::Serialize;

use crate::accessor::Accessor;
use crate::error::Result;
use crate::mesh::Mesh;
use crate::session::{BufferView, ExportSession};
use crate::utils::assemble_glb;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub version: String,
    pub generator: String,
}

/// glTF `buffer`; GLB-embedded buffers carry no URI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Buffer {
    pub byte_length: usize,
}

/// The JSON root written for one export session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GltfDocument<'a> {
    pub asset: Asset,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Buffer>,
    #[serde(skip_serializing_if = "is_empty")]
    pub buffer_views: &'a [BufferView],
    #[serde(skip_serializing_if = "is_empty")]
    pub accessors: &'a [Accessor],
    #[serde(skip_serializing_if = "is_empty")]
    pub meshes: &'a [Mesh],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl ExportSession {
    /// Borrowing JSON root over the current session state
    ///
    /// Trailing empty blobs are left out since glTF buffers need a non-zero
    /// `byteLength`; an empty session lists no buffers at all.
    pub fn to_document(&self, generator: &str) -> GltfDocument<'_> {
        let listed = self
            .buffers
            .iter()
            .rposition(|blob| !blob.is_empty())
            .map_or(0, |last| last + 1);
        GltfDocument {
            asset: Asset {
                version: "2.0".to_string(),
                generator: generator.to_string(),
            },
            buffers: self.buffers[..listed]
                .iter()
                .map(|blob| Buffer {
                    byte_length: blob.len(),
                })
                .collect(),
            buffer_views: &self.views,
            accessors: &self.accessors,
            meshes: &self.meshes,
        }
    }

    pub fn to_json(&self, generator: &str) -> Result<String> {
        Ok(serde_json::to_string(&self.to_document(generator))?)
    }

    /// Binary GLB container with blob 0 as the BIN chunk
    pub fn to_glb(&self, generator: &str) -> Result<Vec<u8>> {
        let json = self.to_json(generator)?;
        if self.buffers.len() > 1 {
            tracing::warn!(
                buffers = self.buffers.len(),
                "only buffer 0 is embedded in the GLB"
            );
        }
        let bin = self.buffers.first().map(|b| b.data()).unwrap_or_default();
        let glb = assemble_glb(json.as_bytes(), bin);
        tracing::debug!(
            json_bytes = json.len(),
            bin_bytes = bin.len(),
            total = glb.len(),
            "assembled GLB"
        );
        Ok(glb)
    }
}
