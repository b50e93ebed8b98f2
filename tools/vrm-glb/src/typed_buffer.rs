//! Read-only typed views over strided vertex/animation bytes

use std::ops::Range;

use crate::error::{ExportError, Result};
use crate::types::{AccessorShape, ComponentType};

/// Strided element data handed to the encoder
///
/// The bytes are borrowed from the caller and never modified.
#[derive(Debug, Clone, Copy)]
pub struct TypedBuffer<'a> {
    bytes: &'a [u8],
    component_type: ComponentType,
    shape: AccessorShape,
    stride: usize,
    count: usize,
}

impl<'a> TypedBuffer<'a> {
    /// Wrap `bytes` as `count` elements spaced `stride` bytes apart
    pub fn new(
        bytes: &'a [u8],
        component_type: ComponentType,
        shape: AccessorShape,
        stride: usize,
        count: usize,
    ) -> Result<Self> {
        check_stride(stride, component_type.size() * shape.component_count())?;
        let required = stride
            .checked_mul(count)
            .ok_or(ExportError::BufferTooShort {
                required: usize::MAX,
                actual: bytes.len(),
            })?;
        if bytes.len() < required {
            return Err(ExportError::BufferTooShort {
                required,
                actual: bytes.len(),
            });
        }
        // Trailing bytes past the last element belong to the caller
        Ok(Self {
            bytes: &bytes[..required],
            component_type,
            shape,
            stride,
            count,
        })
    }

    /// Tightly packed elements; the count is derived from the byte length
    pub fn packed(bytes: &'a [u8], component_type: ComponentType, shape: AccessorShape) -> Self {
        let stride = component_type.size() * shape.component_count();
        let count = bytes.len() / stride;
        Self {
            bytes: &bytes[..count * stride],
            component_type,
            shape,
            stride,
            count,
        }
    }

    /// Tightly packed f32 VEC3 data (positions, normals, morph deltas)
    pub fn from_vec3(data: &'a [[f32; 3]]) -> Self {
        Self::packed(
            bytemuck::cast_slice(data),
            ComponentType::F32,
            AccessorShape::Vec3,
        )
    }

    pub fn from_vec2(data: &'a [[f32; 2]]) -> Self {
        Self::packed(
            bytemuck::cast_slice(data),
            ComponentType::F32,
            AccessorShape::Vec2,
        )
    }

    pub fn from_u32(data: &'a [u32]) -> Self {
        Self::packed(
            bytemuck::cast_slice(data),
            ComponentType::U32,
            AccessorShape::Scalar,
        )
    }

    /// Exactly `count * stride` bytes
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn shape(&self) -> AccessorShape {
        self.shape
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Size of one element without stride padding
    pub fn element_size(&self) -> usize {
        self.component_type.size() * self.shape.component_count()
    }

    /// Byte range covering elements `[offset, offset + count)`
    pub fn byte_range(&self, offset: usize, count: usize) -> Result<Range<usize>> {
        match offset.checked_add(count) {
            Some(end) if end <= self.count => Ok(offset * self.stride..end * self.stride),
            _ => Err(ExportError::Range {
                offset,
                count,
                len: self.count,
            }),
        }
    }

    /// Resolve an optional element range, defaulting to the whole buffer
    pub(crate) fn resolve(&self, range: Option<Range<usize>>) -> Result<(usize, usize)> {
        match range {
            None => Ok((0, self.count)),
            Some(r) if r.start <= r.end => {
                self.byte_range(r.start, r.end - r.start)?;
                Ok((r.start, r.end - r.start))
            }
            Some(r) => Err(ExportError::Range {
                offset: r.start,
                count: 0,
                len: self.count,
            }),
        }
    }

    /// Iterate every element as f32x3, reading the first 12 bytes of each stride
    ///
    /// Only meaningful for `F32`/`VEC3` buffers.
    pub(crate) fn vec3_elements(&self) -> impl Iterator<Item = [f32; 3]> + 'a {
        let stride = self.stride;
        let bytes = self.bytes;
        (0..self.count).map(move |i| {
            let start = i * stride;
            bytemuck::pod_read_unaligned::<[f32; 3]>(&bytes[start..start + 12])
        })
    }
}

/// Check `stride` against the element size and glTF's `byteStride` limits
///
/// Packed data (`stride == element_size`) records no `byteStride` and is
/// always accepted; interleaved strides must be a multiple of 4 in 4..=252.
pub fn check_stride(stride: usize, element_size: usize) -> Result<()> {
    if stride < element_size {
        return Err(ExportError::StrideTooSmall {
            stride,
            element_size,
        });
    }
    if stride != element_size && (stride % 4 != 0 || !(4..=252).contains(&stride)) {
        return Err(ExportError::InvalidByteStride { stride });
    }
    Ok(())
}
