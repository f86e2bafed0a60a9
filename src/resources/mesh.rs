//! Meshes and primitives.
//!
//! A [`Primitive`] is pure data until [`Primitive::finalize`] maps its glTF
//! attribute semantics onto shader attribute names and feature flags. Binding
//! those attributes to GPU buffers is the renderer's business.

use glam::Vec3;

use crate::resources::accessor::{Accessor, AccessorData, ElementType};
use crate::resources::shader_defines::ShaderDefines;

/// Upper bound on morph targets the vertex template declares.
pub const MAX_MORPH_TARGETS: usize = 8;

/// glTF primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    #[must_use]
    pub const fn from_gl(mode: u32) -> Self {
        match mode {
            0 => Self::Points,
            1 => Self::Lines,
            2 => Self::LineLoop,
            3 => Self::LineStrip,
            5 => Self::TriangleStrip,
            6 => Self::TriangleFan,
            _ => Self::Triangles,
        }
    }
}

/// glTF vertex attribute semantics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
    Other(String),
}

impl Semantic {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let indexed = |prefix: &str| name.strip_prefix(prefix).and_then(|n| n.parse::<u32>().ok());
        match name {
            "POSITION" => Self::Position,
            "NORMAL" => Self::Normal,
            "TANGENT" => Self::Tangent,
            _ => {
                if let Some(n) = indexed("TEXCOORD_") {
                    Self::TexCoord(n)
                } else if let Some(n) = indexed("COLOR_") {
                    Self::Color(n)
                } else if let Some(n) = indexed("JOINTS_") {
                    Self::Joints(n)
                } else if let Some(n) = indexed("WEIGHTS_") {
                    Self::Weights(n)
                } else {
                    Self::Other(name.to_string())
                }
            }
        }
    }
}

/// Accessors displaced by one morph target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MorphTarget {
    pub position: Option<usize>,
    pub normal: Option<usize>,
    pub tangent: Option<usize>,
}

/// A shader attribute name bound to the accessor that feeds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub semantic: Semantic,
    pub name: String,
    pub accessor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub attributes: Vec<(Semantic, usize)>,
    pub targets: Vec<MorphTarget>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub mode: DrawMode,

    // === derived (finalize) ===
    bindings: Vec<AttributeBinding>,
    defines: ShaderDefines,
    material_index: usize,
    skip: bool,
    has_joints: bool,
    has_weights: bool,
    centroid: Vec3,
}

impl Primitive {
    #[must_use]
    pub fn new(attributes: Vec<(Semantic, usize)>, indices: Option<usize>, material: Option<usize>) -> Self {
        Self {
            attributes,
            indices,
            material,
            skip: true,
            ..Self::default()
        }
    }

    /// Template the vertex stage of this primitive is generated from.
    #[must_use]
    pub fn shader_identifier(&self) -> &'static str {
        "primitive.vert"
    }

    /// Maps attributes and morph targets to shader names and flags.
    ///
    /// `default_material` is used when the primitive references no material.
    /// At most `max_attributes` attributes are bound; the rest are dropped with
    /// a warning. A primitive without `POSITION` stays marked as skipped.
    pub fn finalize(&mut self, default_material: usize, accessors: &[Accessor], max_attributes: usize) {
        self.material_index = self.material.unwrap_or(default_material);
        self.bindings.clear();
        self.defines.clear();
        self.skip = true;
        self.has_joints = false;
        self.has_weights = false;

        let mut attributes = self.attributes.clone();
        attributes.sort_by(|a, b| a.0.cmp(&b.0));

        for (semantic, accessor) in attributes {
            if self.bindings.len() >= max_attributes {
                log::warn!("Too many vertex attributes for this primitive, skipping {semantic:?}");
                break;
            }

            let (name, define) = match &semantic {
                Semantic::Position => {
                    self.skip = false;
                    ("a_Position".to_string(), None)
                }
                Semantic::Normal => ("a_Normal".to_string(), Some("HAS_NORMALS".to_string())),
                Semantic::Tangent => ("a_Tangent".to_string(), Some("HAS_TANGENTS".to_string())),
                Semantic::TexCoord(set @ (0 | 1)) => (
                    format!("a_UV{}", set + 1),
                    Some(format!("HAS_UV_SET{}", set + 1)),
                ),
                Semantic::Color(0) => {
                    let kind = accessors
                        .get(accessor)
                        .map_or(ElementType::Vec4, |a| a.element_type);
                    (
                        "a_Color".to_string(),
                        Some(format!("HAS_VERTEX_COLOR_{}", kind.name())),
                    )
                }
                Semantic::Joints(set @ (0 | 1)) => {
                    self.has_joints = true;
                    (
                        format!("a_Joint{}", set + 1),
                        Some(format!("HAS_JOINT_SET{}", set + 1)),
                    )
                }
                Semantic::Weights(set @ (0 | 1)) => {
                    self.has_weights = true;
                    (
                        format!("a_Weight{}", set + 1),
                        Some(format!("HAS_WEIGHT_SET{}", set + 1)),
                    )
                }
                other => {
                    log::debug!("Unknown attribute: {other:?}");
                    continue;
                }
            };

            if let Some(define) = define {
                self.defines.enable(&define);
            }
            self.bindings.push(AttributeBinding {
                semantic,
                name,
                accessor,
            });
        }

        for (i, target) in self.targets.iter().enumerate().take(MAX_MORPH_TARGETS) {
            if self.bindings.len() + 3 > max_attributes {
                log::warn!("Too many vertex attributes for this primitive, skipping target {i}");
                break;
            }

            let displaced = [
                (target.position, Semantic::Position, "POSITION", "Position"),
                (target.normal, Semantic::Normal, "NORMAL", "Normal"),
                (target.tangent, Semantic::Tangent, "TANGENT", "Tangent"),
            ];
            for (accessor, semantic, flag, attr) in displaced {
                let Some(accessor) = accessor else { continue };
                self.defines.enable(&format!("HAS_TARGET_{flag}{i}"));
                self.bindings.push(AttributeBinding {
                    semantic,
                    name: format!("a_Target_{attr}{i}"),
                    accessor,
                });
            }
        }
    }

    /// Mean of the referenced positions: indexed vertices when `indices` is
    /// given (repeats count), every vertex otherwise.
    pub fn compute_centroid(&mut self, positions: &AccessorData, indices: Option<&AccessorData>) {
        let position = |v: usize| {
            Vec3::new(
                positions.get_f32(v * 3).unwrap_or(0.0),
                positions.get_f32(v * 3 + 1).unwrap_or(0.0),
                positions.get_f32(v * 3 + 2).unwrap_or(0.0),
            )
        };

        let (sum, n) = match indices {
            Some(indices) => (0..indices.len())
                .filter_map(|i| indices.get_u32(i))
                .fold((Vec3::ZERO, 0usize), |(acc, n), v| (acc + position(v as usize), n + 1)),
            None => {
                let count = positions.len() / 3;
                ((0..count).map(position).sum::<Vec3>(), count)
            }
        };

        self.centroid = if n == 0 { Vec3::ZERO } else { sum / n as f32 };
    }

    #[must_use]
    pub fn bindings(&self) -> &[AttributeBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    /// Material actually used (the default material when none is referenced).
    #[must_use]
    pub fn material_index(&self) -> usize {
        self.material_index
    }

    /// `true` when the primitive cannot be drawn (no `POSITION`).
    #[must_use]
    pub fn skip(&self) -> bool {
        self.skip
    }

    pub fn mark_unrenderable(&mut self) {
        self.skip = true;
    }

    #[must_use]
    pub fn has_joints(&self) -> bool {
        self.has_joints
    }

    #[must_use]
    pub fn has_weights(&self) -> bool {
        self.has_weights
    }

    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    #[must_use]
    pub fn position_accessor(&self) -> Option<usize> {
        self.attributes
            .iter()
            .find(|(s, _)| *s == Semantic::Position)
            .map(|&(_, a)| a)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    /// Default morph weights shared by every instance.
    pub weights: Vec<f32>,
}
