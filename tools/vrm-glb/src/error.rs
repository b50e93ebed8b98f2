//! Error types for buffer/accessor export

/// Errors raised while encoding buffers into an export session
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Shape tag outside SCALAR/VEC2/VEC3/VEC4/MAT2/MAT3/MAT4
    #[error("unsupported accessor shape: {0:?}")]
    UnsupportedShape(String),

    /// Component type tag or code outside the glTF enumeration
    #[error("unsupported component type: {0}")]
    UnsupportedComponentType(String),

    /// Requested element range does not fit inside the buffer
    #[error("element range {offset}..{offset}+{count} exceeds buffer of {len} elements")]
    Range {
        offset: usize,
        count: usize,
        len: usize,
    },

    /// Stride smaller than one element
    #[error("stride {stride} is smaller than element size {element_size}")]
    StrideTooSmall { stride: usize, element_size: usize },

    /// Interleaved stride outside glTF's `byteStride` range (multiple of 4 in 4..=252)
    #[error("byte stride {stride} must be a multiple of 4 between 4 and 252")]
    InvalidByteStride { stride: usize },

    /// Backing bytes cannot hold `count` elements at `stride`
    #[error("buffer holds {actual} bytes but {required} are required")]
    BufferTooShort { required: usize, actual: usize },

    /// Target binary blob does not exist in the session
    #[error("unknown buffer index {0}")]
    UnknownBuffer(usize),

    /// Target buffer view does not exist in the session
    #[error("unknown buffer view index {0}")]
    UnknownView(usize),

    /// Mesh has no vertex positions
    #[error("mesh has no positions")]
    EmptyMesh,

    /// Morph target stream length differs from the base mesh
    #[error("morph target {target} has {actual} vertices, mesh has {expected}")]
    MorphTargetMismatch {
        target: usize,
        expected: usize,
        actual: usize,
    },

    /// JSON chunk serialization failed
    #[error("glTF JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
