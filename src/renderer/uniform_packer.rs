//! Uniform block packing.
//!
//! Values are collected by uniform name and written into the byte image of a
//! stage's uniform block at the offsets the program reflected. Values the
//! program does not declare are ignored; declared members nobody supplied
//! stay zeroed and are reported back to the caller.

use rustc_hash::FxHashMap;

use crate::renderer::device::ShaderStage;
use crate::renderer::pipeline::ProgramReflection;
use crate::resources::uniforms::UniformValue;

/// Named uniform values of one draw.
#[derive(Debug, Default)]
pub struct UniformSet {
    values: FxHashMap<&'static str, UniformValue>,
}

impl UniformSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: UniformValue) {
        self.values.insert(name, value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Packs the members of `stage`'s block. Returns the block bytes and the
/// names of members no value was supplied for.
#[must_use]
pub fn pack_block<'a>(
    reflection: &'a ProgramReflection,
    stage: ShaderStage,
    values: &UniformSet,
) -> (Vec<u8>, Vec<&'a str>) {
    let block_size = match stage {
        ShaderStage::Vertex => reflection.vertex_block_size,
        ShaderStage::Fragment => reflection.fragment_block_size,
    } as usize;

    let mut block = vec![0u8; block_size];
    let mut missing = Vec::new();
    let mut scratch = Vec::with_capacity(256);

    for (name, info) in &reflection.uniforms {
        if info.stage != stage {
            continue;
        }
        let Some(value) = values.get(name) else {
            missing.push(name.as_str());
            continue;
        };

        scratch.clear();
        value.write_bytes(&mut scratch);

        // 截断到成员大小，防止写入下一个成员
        let offset = info.offset as usize;
        let len = scratch.len().min(info.size as usize).min(block_size.saturating_sub(offset));
        block[offset..offset + len].copy_from_slice(&scratch[..len]);
    }

    missing.sort_unstable();
    (block, missing)
}
