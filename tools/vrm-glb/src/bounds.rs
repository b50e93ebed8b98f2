//! Stock min/max callback for float accessors

use crate::accessor::Accessor;
use crate::types::ComponentType;

/// Per-component float bounds of tightly packed elements
///
/// Returns `None` for empty input or when `components` is zero.
pub fn compute_bounds(floats: &[f32], components: usize) -> Option<(Vec<f32>, Vec<f32>)> {
    if components == 0 || floats.len() < components {
        return None;
    }
    let mut min = vec![f32::MAX; components];
    let mut max = vec![f32::MIN; components];

    for element in floats.chunks_exact(components) {
        for i in 0..components {
            min[i] = min[i].min(element[i]);
            max[i] = max[i].max(element[i]);
        }
    }

    Some((min, max))
}

/// Min/max callback usable with the encoder
///
/// Reads `bytes` as packed little-endian f32 elements of the accessor's shape.
/// Accessors with a non-float component type are left untouched.
pub fn float_min_max(bytes: &[u8], accessor: &mut Accessor) {
    if accessor.component_type != ComponentType::F32 {
        return;
    }
    let floats: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    if let Some((min, max)) = compute_bounds(&floats, accessor.shape.component_count()) {
        accessor.min = Some(min);
        accessor.max = Some(max);
    }
}
