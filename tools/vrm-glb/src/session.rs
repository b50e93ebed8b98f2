//! Export session: binary blobs, buffer views and the accessor list

use serde::Serialize;

use crate::accessor::{Accessor, AccessorIndex, ViewIndex};
use crate::error::{ExportError, Result};
use crate::mesh::Mesh;
use crate::utils::align_buffer;

/// Append-only byte storage backing buffer views
#[derive(Debug, Default, Clone)]
pub struct BinaryBlob {
    data: Vec<u8>,
}

impl BinaryBlob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pad to 4 bytes, append `bytes` and return their starting offset
    fn append(&mut self, bytes: &[u8]) -> usize {
        align_buffer(&mut self.data);
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        offset
    }
}

/// glTF `bufferView`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
}

/// All state shared by the accessor encoder during one export
///
/// Encoder calls take `&mut ExportSession`, so appends are strictly
/// sequential.
#[derive(Debug, Clone)]
pub struct ExportSession {
    pub(crate) buffers: Vec<BinaryBlob>,
    pub(crate) views: Vec<BufferView>,
    pub(crate) accessors: Vec<Accessor>,
    pub(crate) meshes: Vec<Mesh>,
}

impl ExportSession {
    /// Session with a single empty blob at buffer index 0
    pub fn new() -> Self {
        Self {
            buffers: vec![BinaryBlob::new()],
            views: Vec::new(),
            accessors: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Add another blob and return its buffer index
    pub fn add_buffer(&mut self) -> usize {
        self.buffers.push(BinaryBlob::new());
        self.buffers.len() - 1
    }

    pub fn buffers(&self) -> &[BinaryBlob] {
        &self.buffers
    }

    pub fn buffer(&self, index: usize) -> Option<&BinaryBlob> {
        self.buffers.get(index)
    }

    pub fn views(&self) -> &[BufferView] {
        &self.views
    }

    pub fn view(&self, index: ViewIndex) -> Option<&BufferView> {
        self.views.get(index.0 as usize)
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    pub fn accessor(&self, index: AccessorIndex) -> Option<&Accessor> {
        self.accessors.get(index.0 as usize)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Bytes a view covers inside its blob
    pub fn view_bytes(&self, index: ViewIndex) -> Option<&[u8]> {
        let view = self.view(index)?;
        let blob = self.buffers.get(view.buffer)?;
        blob.data.get(view.byte_offset..view.byte_offset + view.byte_length)
    }

    /// Append raw bytes to blob `buffer` as a new view
    pub fn append_to_buffer(&mut self, buffer: usize, bytes: &[u8]) -> Result<ViewIndex> {
        self.append_strided(buffer, bytes, None)
    }

    pub(crate) fn append_strided(
        &mut self,
        buffer: usize,
        bytes: &[u8],
        byte_stride: Option<usize>,
    ) -> Result<ViewIndex> {
        let blob = self
            .buffers
            .get_mut(buffer)
            .ok_or(ExportError::UnknownBuffer(buffer))?;
        let byte_offset = blob.append(bytes);
        let index = ViewIndex(self.views.len() as u32);
        self.views.push(BufferView {
            buffer,
            byte_offset,
            byte_length: bytes.len(),
            byte_stride,
        });
        tracing::trace!(
            buffer,
            byte_offset,
            byte_length = bytes.len(),
            view = index.0,
            "appended buffer view"
        );
        Ok(index)
    }

    /// Next accessor index (without creating it)
    pub fn next_accessor_index(&self) -> AccessorIndex {
        AccessorIndex(self.accessors.len() as u32)
    }

    pub(crate) fn push_accessor(&mut self, accessor: Accessor) -> AccessorIndex {
        let index = self.next_accessor_index();
        self.accessors.push(accessor);
        index
    }
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}
