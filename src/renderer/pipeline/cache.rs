//! Shader Permutation Cache
//!
//! Two-level cache in front of the [`RenderDevice`]:
//!
//! - **Variants**: `(template, flags)` → compiled shader stage, keyed by
//!   [`ShaderGenerator::variant_hash`].
//! - **Programs**: `(vertex variant, fragment variant)` → linked program plus
//!   its reflection, keyed by [`ShaderGenerator::program_hash`].
//!
//! Both are filled lazily the first time a primitive needs them and released
//! together by [`ShaderCache::destroy`].

use minijinja::Environment;
use rustc_hash::{FxHashMap, FxHashSet};

use super::reflection::ProgramReflection;
use super::shader_gen::ShaderGenerator;
use super::shader_manager::{create_env, embedded_sources, resolve_includes};
use crate::errors::Result;
use crate::renderer::device::{ProgramKey, RenderDevice, ShaderKey, ShaderStage};
use crate::resources::shader_defines::ShaderDefines;
use crate::utils::interner;

/// A compiled variant and the WGSL it was compiled from.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    pub key: ShaderKey,
    pub stage: ShaderStage,
    pub source: String,
}

/// A linked program and what the renderer needs to feed it.
#[derive(Debug, Clone)]
pub struct GpuProgram {
    pub key: ProgramKey,
    pub reflection: ProgramReflection,
}

pub struct ShaderCache {
    env: Environment<'static>,
    /// Template name → source with includes resolved.
    sources: FxHashMap<String, String>,
    shaders: FxHashMap<u64, CompiledShader>,
    programs: FxHashMap<u64, GpuProgram>,
    /// Variants / programs that failed once; not retried every frame.
    failed: FxHashSet<u64>,
}

impl ShaderCache {
    /// Cache over the embedded WGSL templates.
    pub fn new() -> Result<Self> {
        Self::with_sources(embedded_sources())
    }

    /// Cache over caller-supplied sources (template name → WGSL template).
    pub fn with_sources(sources: FxHashMap<String, String>) -> Result<Self> {
        interner::preload_common_flags();
        Ok(Self {
            env: create_env()?,
            sources: resolve_includes(&sources),
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            failed: FxHashSet::default(),
        })
    }

    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Returns the hash of the `(template, defines)` variant, compiling it on
    /// first use. `None` when the template is unknown or fails to compile.
    pub fn select_variant(
        &mut self,
        device: &mut dyn RenderDevice,
        template_name: &str,
        defines: &ShaderDefines,
    ) -> Option<u64> {
        let Some(body) = self.sources.get(template_name) else {
            log::warn!("Shader template '{template_name}' not found");
            return None;
        };

        let hash = ShaderGenerator::variant_hash(template_name, defines);
        if self.shaders.contains_key(&hash) {
            return Some(hash);
        }
        if self.failed.contains(&hash) {
            return None;
        }

        let stage = ShaderStage::from_template_name(template_name);
        let compiled = ShaderGenerator::generate_shader(&self.env, template_name, body, defines)
            .and_then(|source| {
                let key = device.compile_shader(template_name, stage, &source)?;
                Ok(CompiledShader { key, stage, source })
            });

        match compiled {
            Ok(shader) => {
                log::debug!(
                    "Compiled shader variant {template_name} [{}] -> {hash:016x}",
                    defines.flag_strings().collect::<Vec<_>>().join(", ")
                );
                self.shaders.insert(hash, shader);
                Some(hash)
            }
            Err(e) => {
                log::error!("Failed to build shader variant '{template_name}': {e}");
                self.failed.insert(hash);
                None
            }
        }
    }

    /// Returns the program linked from two cached variants.
    pub fn get_program(
        &mut self,
        device: &mut dyn RenderDevice,
        vertex_hash: u64,
        fragment_hash: u64,
    ) -> Option<&GpuProgram> {
        let hash = ShaderGenerator::program_hash(vertex_hash, fragment_hash);
        if !self.programs.contains_key(&hash) {
            if self.failed.contains(&hash) {
                return None;
            }
            match self.link(device, vertex_hash, fragment_hash) {
                Ok(program) => {
                    log::debug!("Linked program {vertex_hash:016x} + {fragment_hash:016x}");
                    self.programs.insert(hash, program);
                }
                Err(e) => {
                    log::error!("Failed to link program: {e}");
                    self.failed.insert(hash);
                    return None;
                }
            }
        }
        self.programs.get(&hash)
    }

    fn link(&self, device: &mut dyn RenderDevice, vertex_hash: u64, fragment_hash: u64) -> Result<GpuProgram> {
        let (Some(vertex), Some(fragment)) = (self.shaders.get(&vertex_hash), self.shaders.get(&fragment_hash))
        else {
            return Err(crate::errors::LumenError::InvalidHandle("shader variant"));
        };

        let reflection = ProgramReflection::from_sources(&vertex.source, &fragment.source)?;
        let key = device.link_program(vertex.key, fragment.key)?;
        Ok(GpuProgram { key, reflection })
    }

    /// Final WGSL of a compiled variant.
    #[must_use]
    pub fn variant_source(&self, hash: u64) -> Option<&str> {
        self.shaders.get(&hash).map(|s| s.source.as_str())
    }

    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.shaders.len()
    }

    #[must_use]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Releases every linked program and compiled variant.
    pub fn destroy(&mut self, device: &mut dyn RenderDevice) {
        for (_, program) in self.programs.drain() {
            device.destroy_program(program.key);
        }
        for (_, shader) in self.shaders.drain() {
            device.destroy_shader(shader.key);
        }
        self.failed.clear();
    }
}
