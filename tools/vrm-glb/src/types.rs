//! Component type and shape enumerations of the glTF accessor model

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{ExportError, Result};

/// Numeric type of a single accessor component
///
/// Discriminants are the glTF `componentType` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ComponentType {
    I8 = 5120,
    U8 = 5121,
    I16 = 5122,
    U16 = 5123,
    I32 = 5124,
    U32 = 5125,
    F32 = 5126,
}

impl ComponentType {
    /// Size of one component in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
        }
    }

    /// glTF `componentType` code
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            5120 => Ok(Self::I8),
            5121 => Ok(Self::U8),
            5122 => Ok(Self::I16),
            5123 => Ok(Self::U16),
            5124 => Ok(Self::I32),
            5125 => Ok(Self::U32),
            5126 => Ok(Self::F32),
            other => Err(ExportError::UnsupportedComponentType(other.to_string())),
        }
    }

    /// Tag as spelled in manifests (`FLOAT`, `UNSIGNED_SHORT`, ...)
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I8 => "BYTE",
            Self::U8 => "UNSIGNED_BYTE",
            Self::I16 => "SHORT",
            Self::U16 => "UNSIGNED_SHORT",
            Self::I32 => "INT",
            Self::U32 => "UNSIGNED_INT",
            Self::F32 => "FLOAT",
        }
    }
}

impl FromStr for ComponentType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BYTE" => Ok(Self::I8),
            "UNSIGNED_BYTE" => Ok(Self::U8),
            "SHORT" => Ok(Self::I16),
            "UNSIGNED_SHORT" => Ok(Self::U16),
            "INT" => Ok(Self::I32),
            "UNSIGNED_INT" => Ok(Self::U32),
            "FLOAT" => Ok(Self::F32),
            other => Err(ExportError::UnsupportedComponentType(other.to_string())),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

/// Element geometry, independent of component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorShape {
    /// Number of components per element
    pub const fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// glTF `type` tag
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }
}

impl FromStr for AccessorShape {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SCALAR" => Ok(Self::Scalar),
            "VEC2" => Ok(Self::Vec2),
            "VEC3" => Ok(Self::Vec3),
            "VEC4" => Ok(Self::Vec4),
            "MAT2" => Ok(Self::Mat2),
            "MAT3" => Ok(Self::Mat3),
            "MAT4" => Ok(Self::Mat4),
            other => Err(ExportError::UnsupportedShape(other.to_string())),
        }
    }
}

impl fmt::Display for AccessorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AccessorShape {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Map a shape tag straight to its component count
pub fn component_count(tag: &str) -> Result<usize> {
    tag.parse::<AccessorShape>().map(AccessorShape::component_count)
}
