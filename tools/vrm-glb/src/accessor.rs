//! Accessor descriptors and their glTF wire shape

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::types::{AccessorShape, ComponentType};

/// Index into the session accessor list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessorIndex(pub u32);

/// Index into the session buffer view list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ViewIndex(pub u32);

/// Where the dense base data of an accessor lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorSource {
    /// Elements are read from `view` starting at `byte_offset`
    Dense { view: ViewIndex, byte_offset: usize },
    /// No base view; every element is zero unless overridden by `sparse`
    SparseOnly,
}

impl AccessorSource {
    /// Value written to `byteOffset`; sparse-only accessors use `-1`
    pub fn wire_byte_offset(&self) -> i64 {
        match self {
            Self::Dense { byte_offset, .. } => *byte_offset as i64,
            Self::SparseOnly => -1,
        }
    }

    pub fn view(&self) -> Option<ViewIndex> {
        match self {
            Self::Dense { view, .. } => Some(*view),
            Self::SparseOnly => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseIndices {
    pub component_type: ComponentType,
    pub buffer_view: ViewIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparseValues {
    pub buffer_view: ViewIndex,
}

/// glTF `sparse` object; `count` is the number of overridden elements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sparse {
    pub count: usize,
    pub indices: SparseIndices,
    pub values: SparseValues,
}

/// One accessor descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub source: AccessorSource,
    pub component_type: ComponentType,
    pub shape: AccessorShape,
    /// Logical element count (not the sparse override count)
    pub count: usize,
    pub min: Option<Vec<f32>>,
    pub max: Option<Vec<f32>>,
    pub sparse: Option<Sparse>,
}

impl Accessor {
    pub fn dense(
        view: ViewIndex,
        byte_offset: usize,
        component_type: ComponentType,
        shape: AccessorShape,
        count: usize,
    ) -> Self {
        Self {
            source: AccessorSource::Dense { view, byte_offset },
            component_type,
            shape,
            count,
            min: None,
            max: None,
            sparse: None,
        }
    }

    pub fn is_sparse(&self) -> bool {
        self.sparse.is_some()
    }
}

impl Serialize for Accessor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Accessor", 8)?;
        match self.source.view() {
            Some(view) => state.serialize_field("bufferView", &view)?,
            None => state.skip_field("bufferView")?,
        }
        state.serialize_field("byteOffset", &self.source.wire_byte_offset())?;
        state.serialize_field("componentType", &self.component_type)?;
        state.serialize_field("type", &self.shape)?;
        state.serialize_field("count", &self.count)?;
        match &self.min {
            Some(min) => state.serialize_field("min", min)?,
            None => state.skip_field("min")?,
        }
        match &self.max {
            Some(max) => state.serialize_field("max", max)?,
            None => state.skip_field("max")?,
        }
        match &self.sparse {
            Some(sparse) => state.serialize_field("sparse", sparse)?,
            None => state.skip_field("sparse")?,
        }
        state.end()
    }
}
