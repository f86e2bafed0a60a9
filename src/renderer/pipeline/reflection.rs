//! Program Reflection
//!
//! Parses final WGSL with naga and extracts what the renderer binds by name:
//! vertex inputs (attribute name → location), uniform struct members
//! (name → block, offset, size) and sampled textures (name → bindings).
//!
//! Layout conventions of the templates:
//! - group 0, binding 0: vertex uniform struct
//! - group 0, binding 1: fragment uniform struct
//! - group 1: `texture_2d` / `texture_cube` named `u_*Sampler` (or `u_GGXLUT`),
//!   each followed by a `sampler` named `<texture>_sampler`

use rustc_hash::FxHashMap;

use crate::errors::{LumenError, Result};
use crate::renderer::device::{ScalarKind, ShaderStage, VertexFormat};

/// A vertex input of the vertex entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInfo {
    pub location: u32,
    pub format: VertexFormat,
}

/// A member of one of the two uniform blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformInfo {
    pub stage: ShaderStage,
    pub offset: u32,
    /// Member size including trailing padding up to the next member.
    pub size: u32,
}

/// A texture / sampler pair in group 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerInfo {
    pub binding: u32,
    pub sampler_binding: u32,
    pub cube: bool,
}

/// Reflection of one stage.
#[derive(Debug, Clone, Default)]
pub struct StageReflection {
    pub attributes: FxHashMap<String, AttributeInfo>,
    pub uniforms: FxHashMap<String, UniformInfo>,
    pub block_size: u32,
    pub textures: FxHashMap<String, SamplerInfo>,
}

/// Reflection of a linked vertex + fragment program.
#[derive(Debug, Clone, Default)]
pub struct ProgramReflection {
    pub attributes: FxHashMap<String, AttributeInfo>,
    pub uniforms: FxHashMap<String, UniformInfo>,
    pub textures: FxHashMap<String, SamplerInfo>,
    pub vertex_block_size: u32,
    pub fragment_block_size: u32,
}

impl ProgramReflection {
    #[must_use]
    pub fn link(vertex: StageReflection, fragment: StageReflection) -> Self {
        let mut uniforms = vertex.uniforms;
        uniforms.extend(fragment.uniforms);

        let mut textures = vertex.textures;
        textures.extend(fragment.textures);

        Self {
            attributes: vertex.attributes,
            uniforms,
            textures,
            vertex_block_size: vertex.block_size,
            fragment_block_size: fragment.block_size,
        }
    }

    /// Reflects both stages from source.
    pub fn from_sources(vertex_source: &str, fragment_source: &str) -> Result<Self> {
        let vertex = reflect_stage(vertex_source, ShaderStage::Vertex)?;
        let fragment = reflect_stage(fragment_source, ShaderStage::Fragment)?;
        Ok(Self::link(vertex, fragment))
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn uniform(&self, name: &str) -> Option<&UniformInfo> {
        self.uniforms.get(name)
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<&SamplerInfo> {
        self.textures.get(name)
    }
}

/// Binding slot of a stage's uniform block in group 0.
#[must_use]
pub const fn uniform_binding(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => 0,
        ShaderStage::Fragment => 1,
    }
}

pub const UNIFORM_GROUP: u32 = 0;
pub const TEXTURE_GROUP: u32 = 1;

/// Parses `source` and reflects the parts of it owned by `stage`.
pub fn reflect_stage(source: &str, stage: ShaderStage) -> Result<StageReflection> {
    let module = naga::front::wgsl::parse_str(source)?;
    let mut reflection = StageReflection::default();

    // 1. Uniform block members
    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        if var.space != naga::AddressSpace::Uniform
            || binding.group != UNIFORM_GROUP
            || binding.binding != uniform_binding(stage)
        {
            continue;
        }

        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return Err(LumenError::WgslParseError(format!(
                "uniform block at binding {} is not a struct",
                binding.binding
            )));
        };

        reflection.block_size = *span;
        for (i, member) in members.iter().enumerate() {
            let Some(name) = &member.name else { continue };
            let end = members.get(i + 1).map_or(*span, |next| next.offset);
            reflection.uniforms.insert(
                name.clone(),
                UniformInfo {
                    stage,
                    offset: member.offset,
                    size: end - member.offset,
                },
            );
        }
    }

    // 2. Textures and their samplers
    let mut samplers: FxHashMap<&str, u32> = FxHashMap::default();
    let mut images: Vec<(&str, u32, bool)> = Vec::new();
    for (_, var) in module.global_variables.iter() {
        let (Some(name), Some(binding)) = (&var.name, &var.binding) else {
            continue;
        };
        if binding.group != TEXTURE_GROUP {
            continue;
        }
        match &module.types[var.ty].inner {
            naga::TypeInner::Image { dim, .. } => {
                images.push((name.as_str(), binding.binding, *dim == naga::ImageDimension::Cube));
            }
            naga::TypeInner::Sampler { .. } => {
                samplers.insert(name.as_str(), binding.binding);
            }
            _ => {}
        }
    }
    for (name, binding, cube) in images {
        let Some(&sampler_binding) = samplers.get(format!("{name}_sampler").as_str()) else {
            log::warn!("Texture '{name}' has no matching sampler, ignoring it");
            continue;
        };
        reflection.textures.insert(
            name.to_string(),
            SamplerInfo {
                binding,
                sampler_binding,
                cube,
            },
        );
    }

    // 3. Vertex inputs
    if stage == ShaderStage::Vertex {
        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == naga::ShaderStage::Vertex && ep.name == stage.entry_point())
            .ok_or_else(|| LumenError::WgslParseError("missing vertex entry point 'vs_main'".to_string()))?;

        for argument in &entry.function.arguments {
            match (&argument.binding, &module.types[argument.ty].inner) {
                (Some(binding), inner) => {
                    if let (Some(name), Some(attribute)) = (&argument.name, attribute_info(binding, inner)) {
                        reflection.attributes.insert(name.clone(), attribute);
                    }
                }
                (None, naga::TypeInner::Struct { members, .. }) => {
                    for member in members {
                        let Some(binding) = &member.binding else { continue };
                        let inner = &module.types[member.ty].inner;
                        if let (Some(name), Some(attribute)) = (&member.name, attribute_info(binding, inner)) {
                            reflection.attributes.insert(name.clone(), attribute);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Ok(reflection)
}

fn attribute_info(binding: &naga::Binding, inner: &naga::TypeInner) -> Option<AttributeInfo> {
    let naga::Binding::Location { location, .. } = binding else {
        return None;
    };

    let (scalar, components) = match inner {
        naga::TypeInner::Scalar(scalar) => (*scalar, 1),
        naga::TypeInner::Vector { size, scalar } => (*scalar, *size as u32),
        _ => return None,
    };
    let kind = match scalar.kind {
        naga::ScalarKind::Uint | naga::ScalarKind::Sint => ScalarKind::Uint,
        _ => ScalarKind::Float,
    };

    Some(AttributeInfo {
        location: *location,
        format: VertexFormat { kind, components },
    })
}
