//! Mesh export: dense base attributes plus sparse-eligible morph targets

use std::collections::BTreeMap;

use serde::Serialize;

use crate::accessor::AccessorIndex;
use crate::bounds::float_min_max;
use crate::encoder::AccessorTarget;
use crate::error::{ExportError, Result};
use crate::session::ExportSession;
use crate::typed_buffer::TypedBuffer;

/// glTF mesh primitive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub attributes: BTreeMap<String, AccessorIndex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<AccessorIndex>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<BTreeMap<String, AccessorIndex>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshExtras {
    pub target_names: Vec<String>,
}

/// glTF mesh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub name: String,
    pub primitives: Vec<Primitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<MeshExtras>,
}

/// Accessor indices for one morph target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphTargetAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
}

/// Accessor indices for a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshAccessors {
    pub mesh: usize,
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub uvs: Option<AccessorIndex>,
    pub indices: Option<AccessorIndex>,
    pub targets: Vec<MorphTargetAccessors>,
}

/// Blend shape deltas relative to the base mesh
#[derive(Debug, Clone)]
pub struct MorphTarget {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
}

/// Builder for mesh data
pub struct MeshExporter {
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Option<Vec<[f32; 2]>>,
    indices: Option<Vec<u32>>,
    targets: Vec<MorphTarget>,
    sparse_targets: bool,
}

impl MeshExporter {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            uvs: None,
            indices: None,
            targets: Vec::new(),
            sparse_targets: true,
        }
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &[[f32; 3]]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    pub fn normals(mut self, normals: &[[f32; 3]]) -> Self {
        self.normals = Some(normals.to_vec());
        self
    }

    pub fn uvs(mut self, uvs: &[[f32; 2]]) -> Self {
        self.uvs = Some(uvs.to_vec());
        self
    }

    pub fn indices(mut self, indices: &[u32]) -> Self {
        self.indices = Some(indices.to_vec());
        self
    }

    /// Add a morph target; deltas must cover every vertex
    pub fn morph_target(mut self, target: MorphTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Allow sparse encoding of morph target deltas (default: on)
    pub fn sparse_targets(mut self, enabled: bool) -> Self {
        self.sparse_targets = enabled;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.positions.is_empty() {
            return Err(ExportError::EmptyMesh);
        }
        let expected = self.positions.len();
        for (target, morph) in self.targets.iter().enumerate() {
            let lengths = std::iter::once(morph.positions.len())
                .chain(morph.normals.as_ref().map(Vec::len));
            for actual in lengths {
                if actual != expected {
                    return Err(ExportError::MorphTargetMismatch {
                        target,
                        expected,
                        actual,
                    });
                }
            }
        }
        Ok(())
    }

    /// Encode every stream into blob `buffer` and append the mesh to the session
    pub fn build(
        self,
        session: &mut ExportSession,
        buffer: usize,
        name: &str,
    ) -> Result<MeshAccessors> {
        self.validate()?;
        if session.buffer(buffer).is_none() {
            return Err(ExportError::UnknownBuffer(buffer));
        }

        let mut bounds = float_min_max;
        let positions = session.add_accessor(
            &TypedBuffer::from_vec3(&self.positions),
            AccessorTarget::dense(buffer),
            Some(&mut bounds),
            None,
        )?;
        let normals = self
            .normals
            .as_ref()
            .map(|n| {
                session.add_accessor(
                    &TypedBuffer::from_vec3(n),
                    AccessorTarget::dense(buffer),
                    None,
                    None,
                )
            })
            .transpose()?;
        let uvs = self
            .uvs
            .as_ref()
            .map(|uv| {
                session.add_accessor(
                    &TypedBuffer::from_vec2(uv),
                    AccessorTarget::dense(buffer),
                    None,
                    None,
                )
            })
            .transpose()?;
        let indices = self
            .indices
            .as_ref()
            .map(|i| {
                session.add_accessor(
                    &TypedBuffer::from_u32(i),
                    AccessorTarget::dense(buffer),
                    None,
                    None,
                )
            })
            .transpose()?;

        let target_mode = AccessorTarget::Buffer {
            index: buffer,
            allow_sparse: self.sparse_targets,
        };
        let mut targets = Vec::with_capacity(self.targets.len());
        for morph in &self.targets {
            let positions = session.add_accessor(
                &TypedBuffer::from_vec3(&morph.positions),
                target_mode,
                Some(&mut bounds),
                None,
            )?;
            let normals = morph
                .normals
                .as_ref()
                .map(|n| session.add_accessor(&TypedBuffer::from_vec3(n), target_mode, None, None))
                .transpose()?;
            targets.push(MorphTargetAccessors { positions, normals });
        }

        let mut attributes = BTreeMap::new();
        attributes.insert("POSITION".to_string(), positions);
        if let Some(normals) = normals {
            attributes.insert("NORMAL".to_string(), normals);
        }
        if let Some(uvs) = uvs {
            attributes.insert("TEXCOORD_0".to_string(), uvs);
        }

        let primitive_targets = targets
            .iter()
            .map(|t| {
                let mut map = BTreeMap::new();
                map.insert("POSITION".to_string(), t.positions);
                if let Some(normals) = t.normals {
                    map.insert("NORMAL".to_string(), normals);
                }
                map
            })
            .collect();

        let extras = (!self.targets.is_empty()).then(|| MeshExtras {
            target_names: self.targets.iter().map(|t| t.name.clone()).collect(),
        });

        session.meshes.push(Mesh {
            name: name.to_string(),
            primitives: vec![Primitive {
                attributes,
                indices,
                targets: primitive_targets,
            }],
            extras,
        });
        let mesh = session.meshes.len() - 1;
        tracing::debug!(mesh, mesh_name = name, targets = targets.len(), "exported mesh");

        Ok(MeshAccessors {
            mesh,
            positions,
            normals,
            uvs,
            indices,
            targets,
        })
    }
}

impl Default for MeshExporter {
    fn default() -> Self {
        Self::new()
    }
}
