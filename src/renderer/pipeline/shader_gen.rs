//! Shader Variant Generation
//!
//! A variant is a template plus an ordered list of feature flags. Its final
//! WGSL is the template body rendered after one `$$ set` line per flag, and its
//! identity is a 64-bit xxh3 hash of the template name and the flags.

use minijinja::Environment;
use minijinja::value::Value;
use xxhash_rust::xxh3::xxh3_64;

use super::shader_manager::LocationAllocator;
use crate::errors::Result;
use crate::resources::shader_defines::ShaderDefines;

pub struct ShaderGenerator;

impl ShaderGenerator {
    /// `xxh3(name)` folded with the xxh3 of every `"NAME VALUE"` flag.
    #[must_use]
    pub fn variant_hash(template_name: &str, defines: &ShaderDefines) -> u64 {
        defines
            .flag_strings()
            .fold(xxh3_64(template_name.as_bytes()), |hash, flag| {
                hash ^ xxh3_64(flag.as_bytes())
            })
    }

    /// Key of the program linked from two variants.
    #[must_use]
    pub fn program_hash(vertex_hash: u64, fragment_hash: u64) -> u64 {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&vertex_hash.to_le_bytes());
        bytes[8..].copy_from_slice(&fragment_hash.to_le_bytes());
        xxh3_64(&bytes)
    }

    /// Template source with the flag definitions prepended.
    #[must_use]
    pub fn variant_source(body: &str, defines: &ShaderDefines) -> String {
        let mut source = String::with_capacity(body.len() + defines.len() * 32);
        for (name, value) in defines.iter_strings() {
            if value.parse::<f64>().is_ok() {
                source.push_str(&format!("$$ set {name} = {value}\n"));
            } else {
                source.push_str(&format!("$$ set {name} = {value:?}\n"));
            }
        }
        source.push_str(body);
        source
    }

    /// Renders the final WGSL of a variant.
    pub fn generate_shader(
        env: &Environment<'static>,
        template_name: &str,
        body: &str,
        defines: &ShaderDefines,
    ) -> Result<String> {
        let source = Self::variant_source(body, defines);
        let loc = Value::from_object(LocationAllocator::new());
        let rendered = env.render_str(&source, minijinja::context! { loc => loc })?;
        Ok(format!("// === {template_name} ===\n{rendered}"))
    }
}
