//! Accessor encoder: dense view packing and the sparse/dense decision
//!
//! Every attribute stream goes through [`ExportSession::add_accessor`]. Float
//! VEC3 streams (morph target deltas in practice) may be written as sparse-only
//! accessors when most elements are zero and the sparse layout is strictly
//! smaller than the dense one.

use std::ops::Range;

use glam::Vec3;

use crate::accessor::{
    Accessor, AccessorIndex, AccessorSource, Sparse, SparseIndices, SparseValues, ViewIndex,
};
use crate::error::{ExportError, Result};
use crate::scratch::ScratchBytes;
use crate::session::ExportSession;
use crate::typed_buffer::TypedBuffer;
use crate::types::{AccessorShape, ComponentType};

/// Bytes per sparse override index (u32)
const SPARSE_INDEX_SIZE: usize = 4;
/// Bytes per f32 VEC3 element
const VEC3_SIZE: usize = 12;

/// Callback that fills `min`/`max` by inspecting raw element bytes
pub type MinMaxFn<'a> = &'a mut dyn FnMut(&[u8], &mut Accessor);

/// Destination of an accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorTarget {
    /// Append the data to blob `index`, sparse-encoding it when allowed and smaller
    Buffer { index: usize, allow_sparse: bool },
    /// Describe data already appended as this view
    View(ViewIndex),
}

impl AccessorTarget {
    /// Dense append to blob `index`
    pub fn dense(index: usize) -> Self {
        Self::Buffer {
            index,
            allow_sparse: false,
        }
    }

    /// Append to blob `index`, letting the encoder choose sparse
    pub fn sparse(index: usize) -> Self {
        Self::Buffer {
            index,
            allow_sparse: true,
        }
    }
}

/// Only f32 VEC3 streams are considered for sparse encoding
pub fn is_sparse_eligible(component_type: ComponentType, shape: AccessorShape) -> bool {
    component_type == ComponentType::F32 && shape == AccessorShape::Vec3
}

/// Whether `non_zero` overrides out of `total` elements beat the dense layout
///
/// Sparse costs `16n` bytes (u32 index + f32 VEC3 value), dense costs `12N`.
/// An empty override set is never considered smaller.
pub fn sparse_is_smaller(non_zero: usize, total: usize) -> bool {
    non_zero > 0 && non_zero * (SPARSE_INDEX_SIZE + VEC3_SIZE) < total * VEC3_SIZE
}

impl ExportSession {
    /// Append elements `range` (default: all) of `buffer` to blob `buffer_index`
    ///
    /// Interleaved buffers record `byteStride`; [`TypedBuffer::new`] only
    /// accepts strides glTF allows there.
    pub fn add_view_to(
        &mut self,
        buffer: &TypedBuffer<'_>,
        buffer_index: usize,
        range: Option<Range<usize>>,
    ) -> Result<ViewIndex> {
        let (offset, count) = buffer.resolve(range)?;
        let bytes = &buffer.bytes()[buffer.byte_range(offset, count)?];
        let byte_stride = (buffer.stride() != buffer.element_size()).then_some(buffer.stride());
        self.append_strided(buffer_index, bytes, byte_stride)
    }

    /// Describe `view` with the element type of `buffer` and append the descriptor
    ///
    /// `count` defaults to the buffer's element count. The min/max callback
    /// receives the buffer's full byte range regardless of `count`.
    pub fn add_accessor_to(
        &mut self,
        buffer: &TypedBuffer<'_>,
        view: ViewIndex,
        min_max: Option<MinMaxFn<'_>>,
        count: Option<usize>,
        byte_offset: usize,
    ) -> Result<AccessorIndex> {
        if self.view(view).is_none() {
            return Err(ExportError::UnknownView(view.0 as usize));
        }
        let mut accessor = Accessor::dense(
            view,
            byte_offset,
            buffer.component_type(),
            buffer.shape(),
            count.unwrap_or(buffer.count()),
        );
        if let Some(min_max) = min_max {
            min_max(buffer.bytes(), &mut accessor);
        }
        Ok(self.push_accessor(accessor))
    }

    /// Encode `buffer` as one accessor and return its index
    ///
    /// With [`AccessorTarget::Buffer`] and `allow_sparse`, eligible streams are
    /// scanned in full and written sparse-only when [`sparse_is_smaller`]
    /// holds; `range` only applies to the dense fallback. With
    /// [`AccessorTarget::View`] the descriptor points into the existing view at
    /// `range.start * stride`.
    pub fn add_accessor(
        &mut self,
        buffer: &TypedBuffer<'_>,
        target: AccessorTarget,
        min_max: Option<MinMaxFn<'_>>,
        range: Option<Range<usize>>,
    ) -> Result<AccessorIndex> {
        match target {
            AccessorTarget::View(view) => {
                let (offset, count) = buffer.resolve(range)?;
                self.add_accessor_to(buffer, view, min_max, Some(count), offset * buffer.stride())
            }
            AccessorTarget::Buffer {
                index,
                allow_sparse,
            } => {
                if allow_sparse && is_sparse_eligible(buffer.component_type(), buffer.shape()) {
                    let overrides = collect_non_zero(buffer)?;
                    if sparse_is_smaller(overrides.len(), buffer.count()) {
                        return self.add_sparse_accessor(buffer, index, &overrides, min_max);
                    }
                    tracing::debug!(
                        non_zero = overrides.len(),
                        total = buffer.count(),
                        "sparse layout not smaller, writing dense"
                    );
                }
                let (_, count) = buffer.resolve(range.clone())?;
                let view = self.add_view_to(buffer, index, range)?;
                self.add_accessor_to(buffer, view, min_max, Some(count), 0)
            }
        }
    }

    fn add_sparse_accessor(
        &mut self,
        buffer: &TypedBuffer<'_>,
        buffer_index: usize,
        overrides: &[(u32, [f32; 3])],
        min_max: Option<MinMaxFn<'_>>,
    ) -> Result<AccessorIndex> {
        if buffer_index >= self.buffers.len() {
            return Err(ExportError::UnknownBuffer(buffer_index));
        }

        let mut index_bin = ScratchBytes::zeroed(overrides.len() * SPARSE_INDEX_SIZE);
        let mut value_bin = ScratchBytes::zeroed(overrides.len() * VEC3_SIZE);
        let slots = index_bin
            .as_mut_slice()
            .chunks_exact_mut(SPARSE_INDEX_SIZE)
            .zip(value_bin.as_mut_slice().chunks_exact_mut(VEC3_SIZE));
        for ((index, value), (index_out, value_out)) in overrides.iter().zip(slots) {
            index_out.copy_from_slice(&index.to_le_bytes());
            value_out.copy_from_slice(bytemuck::bytes_of(value));
        }

        let index_view = self.append_to_buffer(buffer_index, index_bin.as_slice())?;
        let value_view = self.append_to_buffer(buffer_index, value_bin.as_slice())?;

        let mut accessor = Accessor {
            source: AccessorSource::SparseOnly,
            component_type: buffer.component_type(),
            shape: buffer.shape(),
            count: buffer.count(),
            min: None,
            max: None,
            sparse: Some(Sparse {
                count: overrides.len(),
                indices: SparseIndices {
                    component_type: ComponentType::U32,
                    buffer_view: index_view,
                },
                values: SparseValues {
                    buffer_view: value_view,
                },
            }),
        };
        // Bounds cover the override values only
        if let Some(min_max) = min_max {
            min_max(value_bin.as_slice(), &mut accessor);
        }

        tracing::debug!(
            non_zero = overrides.len(),
            total = buffer.count(),
            "wrote sparse accessor"
        );
        Ok(self.push_accessor(accessor))
    }
}

/// Every element that is not exactly the zero vector, in index order
fn collect_non_zero(buffer: &TypedBuffer<'_>) -> Result<Vec<(u32, [f32; 3])>> {
    buffer
        .vec3_elements()
        .enumerate()
        .filter(|(_, value)| Vec3::from_array(*value) != Vec3::ZERO)
        .map(|(index, value)| Ok((sparse_index(index, buffer.count())?, value)))
        .collect()
}

/// Sparse indices are written as UNSIGNED_INT
fn sparse_index(index: usize, len: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| ExportError::Range {
        offset: index,
        count: 1,
        len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::float_min_max;
    use crate::scratch::live_scratch_buffers;

    /// `total` zero vectors with `non_zero` of them (evenly spread) set
    fn morph_deltas(total: usize, non_zero: usize) -> Vec<[f32; 3]> {
        let mut data = vec![[0.0f32; 3]; total];
        if non_zero > 0 {
            let step = total / non_zero;
            for i in 0..non_zero {
                data[i * step] = [i as f32 + 1.0, 0.5, -0.25];
            }
        }
        data
    }

    fn read_u32s(bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn read_f32s(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_sparse_is_smaller_heuristic() {
        assert!(!sparse_is_smaller(0, 1000));
        assert!(!sparse_is_smaller(8, 10)); // 128 >= 96
        assert!(sparse_is_smaller(10, 1000)); // 160 < 9000
        // 16n == 12N is not strictly smaller
        assert!(!sparse_is_smaller(3, 4));
        assert!(sparse_is_smaller(2, 4));
    }

    #[test]
    fn test_all_zero_buffer_is_never_sparse() {
        let data = vec![[0.0f32; 3]; 64];
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();

        let accessor = session.accessor(index).unwrap();
        assert!(!accessor.is_sparse());
        assert_eq!(accessor.count, 64);
        assert_eq!(session.views().len(), 1);
        assert_eq!(session.views()[0].byte_length, 64 * 12);
    }

    #[test]
    fn test_dense_when_sparse_not_strictly_smaller() {
        let data = morph_deltas(10, 8);
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();

        let accessor = session.accessor(index).unwrap();
        assert!(accessor.sparse.is_none());
        assert_eq!(accessor.source.wire_byte_offset(), 0);
        assert_eq!(session.views()[0].byte_length, 120);
    }

    #[test]
    fn test_sparse_chosen_for_mostly_zero_deltas() {
        let data = morph_deltas(1000, 10);
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();

        let accessor = session.accessor(index).unwrap();
        assert_eq!(accessor.source, AccessorSource::SparseOnly);
        assert_eq!(accessor.source.wire_byte_offset(), -1);
        assert_eq!(accessor.count, 1000);
        let sparse = accessor.sparse.as_ref().unwrap();
        assert_eq!(sparse.count, 10);
        assert_eq!(sparse.indices.component_type, ComponentType::U32);

        let index_view = session.view(sparse.indices.buffer_view).unwrap();
        let value_view = session.view(sparse.values.buffer_view).unwrap();
        assert_eq!(index_view.byte_length, 40);
        assert_eq!(value_view.byte_length, 120);

        let values = read_f32s(session.view_bytes(sparse.values.buffer_view).unwrap());
        assert_eq!(values.len(), 30);
        assert_eq!(&values[..3], &[1.0, 0.5, -0.25]);
    }

    #[test]
    fn test_sparse_indices_strictly_increasing() {
        let mut data = vec![[0.0f32; 3]; 200];
        for i in [3usize, 17, 18, 90, 150, 199] {
            data[i] = [0.0, 1.0, 0.0];
        }
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();
        let sparse = session.accessor(index).unwrap().sparse.clone().unwrap();

        let indices = read_u32s(session.view_bytes(sparse.indices.buffer_view).unwrap());
        assert_eq!(indices, vec![3, 17, 18, 90, 150, 199]);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_negative_zero_counts_as_zero() {
        let mut data = vec![[-0.0f32, 0.0, -0.0]; 100];
        data[42] = [0.0, 0.0, 1.0e-30];
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();
        let sparse = session.accessor(index).unwrap().sparse.clone().unwrap();
        assert_eq!(sparse.count, 1);
        assert_eq!(
            read_u32s(session.view_bytes(sparse.indices.buffer_view).unwrap()),
            vec![42]
        );
    }

    #[test]
    fn test_ineligible_shapes_never_sparse() {
        let vec4 = vec![[0.0f32; 4]; 100];
        let vec4_buffer = TypedBuffer::packed(
            bytemuck::cast_slice(&vec4),
            ComponentType::F32,
            AccessorShape::Vec4,
        );
        let shorts = vec![[0i16; 3]; 100];
        let short_buffer = TypedBuffer::packed(
            bytemuck::cast_slice(&shorts),
            ComponentType::I16,
            AccessorShape::Vec3,
        );

        let mut session = ExportSession::new();
        let a = session
            .add_accessor(&vec4_buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();
        let b = session
            .add_accessor(&short_buffer, AccessorTarget::sparse(0), None, None)
            .unwrap();

        assert!(!session.accessor(a).unwrap().is_sparse());
        assert!(!session.accessor(b).unwrap().is_sparse());
        assert_eq!(session.views()[0].byte_length, 100 * 16);
        assert_eq!(session.views()[1].byte_length, 100 * 6);
    }

    #[test]
    fn test_sparse_flag_off_writes_dense() {
        let data = morph_deltas(1000, 10);
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::dense(0), None, None)
            .unwrap();
        assert!(!session.accessor(index).unwrap().is_sparse());
        assert_eq!(session.views()[0].byte_length, 12_000);
    }

    #[test]
    fn test_dense_view_length_matches_stride() {
        // Interleaved 20-byte vertices
        let floats = vec![1.0f32; 5 * 7];
        let buffer = TypedBuffer::new(
            bytemuck::cast_slice(&floats),
            ComponentType::F32,
            AccessorShape::Vec3,
            20,
            7,
        )
        .unwrap();
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::dense(0), None, None)
            .unwrap();
        let accessor = session.accessor(index).unwrap();
        let view = session.view(accessor.source.view().unwrap()).unwrap();
        assert_eq!(view.byte_length, 7 * 20);
        assert_eq!(view.byte_stride, Some(20));
    }

    #[test]
    fn test_dense_sub_range() {
        let data: Vec<u32> = (0..10).collect();
        let buffer = TypedBuffer::from_u32(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::dense(0), None, Some(2..6))
            .unwrap();
        let accessor = session.accessor(index).unwrap();
        assert_eq!(accessor.count, 4);
        assert_eq!(accessor.source.wire_byte_offset(), 0);
        let bytes = session.view_bytes(accessor.source.view().unwrap()).unwrap();
        assert_eq!(read_u32s(bytes), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_sparse_path_ignores_sub_range() {
        let data = morph_deltas(1000, 10);
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), None, Some(0..10))
            .unwrap();
        let accessor = session.accessor(index).unwrap();
        assert!(accessor.is_sparse());
        assert_eq!(accessor.count, 1000);
    }

    #[test]
    fn test_view_target_uses_byte_offset() {
        let data: Vec<u32> = (0..8).collect();
        let buffer = TypedBuffer::from_u32(&data);
        let mut session = ExportSession::new();
        let view = session.add_view_to(&buffer, 0, None).unwrap();

        let index = session
            .add_accessor(&buffer, AccessorTarget::View(view), None, Some(3..8))
            .unwrap();
        let accessor = session.accessor(index).unwrap();
        assert_eq!(
            accessor.source,
            AccessorSource::Dense {
                view,
                byte_offset: 12
            }
        );
        assert_eq!(accessor.count, 5);
        assert_eq!(session.views().len(), 1);
    }

    #[test]
    fn test_out_of_range_appends_nothing() {
        let data = [[1.0f32; 3]; 4];
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        let err = session
            .add_accessor(&buffer, AccessorTarget::dense(0), None, Some(2..9))
            .unwrap_err();
        assert!(matches!(err, ExportError::Range { offset: 2, count: 7, len: 4 }));
        assert!(session.accessors().is_empty());
        assert!(session.views().is_empty());
        assert!(session.buffers()[0].is_empty());
    }

    #[test]
    fn test_unknown_targets() {
        let data = morph_deltas(1000, 10);
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();

        assert!(matches!(
            session.add_accessor(&buffer, AccessorTarget::sparse(5), None, None),
            Err(ExportError::UnknownBuffer(5))
        ));
        assert!(matches!(
            session.add_accessor(&buffer, AccessorTarget::View(ViewIndex(0)), None, None),
            Err(ExportError::UnknownView(0))
        ));
        assert!(session.accessors().is_empty());
    }

    #[test]
    fn test_min_max_sees_full_buffer_on_dense_path() {
        let data: Vec<u32> = (0..10).collect();
        let buffer = TypedBuffer::from_u32(&data);
        let mut session = ExportSession::new();
        let mut seen = 0;
        let mut record = |bytes: &[u8], _: &mut Accessor| seen = bytes.len();

        session
            .add_accessor(&buffer, AccessorTarget::dense(0), Some(&mut record), Some(0..2))
            .unwrap();
        assert_eq!(seen, 40);
    }

    #[test]
    fn test_min_max_ignores_bytes_past_count() {
        let data = [[1.0f32; 3], [2.0; 3], [100.0; 3], [-100.0; 3]];
        let buffer = TypedBuffer::new(
            bytemuck::cast_slice(&data),
            ComponentType::F32,
            AccessorShape::Vec3,
            12,
            2,
        )
        .unwrap();
        let mut session = ExportSession::new();
        let mut bounds = float_min_max;

        let index = session
            .add_accessor(&buffer, AccessorTarget::dense(0), Some(&mut bounds), None)
            .unwrap();
        let accessor = session.accessor(index).unwrap();
        assert_eq!(accessor.count, 2);
        assert_eq!(accessor.min, Some(vec![1.0, 1.0, 1.0]));
        assert_eq!(accessor.max, Some(vec![2.0, 2.0, 2.0]));
        assert_eq!(session.views()[0].byte_length, 24);
    }

    #[test]
    fn test_sparse_index_overflow_is_a_range_error() {
        assert_eq!(sparse_index(7, 10).unwrap(), 7);
        assert_eq!(sparse_index(u32::MAX as usize, usize::MAX).unwrap(), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            sparse_index(u32::MAX as usize + 1, usize::MAX),
            Err(ExportError::Range { count: 1, .. })
        ));
    }

    #[test]
    fn test_min_max_sees_override_values_on_sparse_path() {
        let mut data = vec![[0.0f32; 3]; 100];
        data[10] = [1.0, -2.0, 3.0];
        data[20] = [-4.0, 5.0, 0.0];
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();
        let mut bounds = float_min_max;

        let index = session
            .add_accessor(&buffer, AccessorTarget::sparse(0), Some(&mut bounds), None)
            .unwrap();
        let accessor = session.accessor(index).unwrap();
        assert!(accessor.is_sparse());
        // Implicit zeros are not part of the bounds
        assert_eq!(accessor.min.as_deref(), Some(&[-4.0, -2.0, 0.0][..]));
        assert_eq!(accessor.max.as_deref(), Some(&[1.0, 5.0, 3.0][..]));
    }

    #[test]
    fn test_scratch_released_after_sparse_call() {
        let data = morph_deltas(1000, 10);
        let buffer = TypedBuffer::from_vec3(&data);
        let mut session = ExportSession::new();
        let mut live_during_callback = 0;
        let mut probe = |_: &[u8], _: &mut Accessor| live_during_callback = live_scratch_buffers();

        session
            .add_accessor(&buffer, AccessorTarget::sparse(0), Some(&mut probe), None)
            .unwrap();
        assert_eq!(live_during_callback, 2);
        assert_eq!(live_scratch_buffers(), 0);
    }
}
