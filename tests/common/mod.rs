//! Shared test fixtures: a recording `RenderDevice` and small embedded glTF documents.

#![allow(dead_code)]

use lumen::errors::{LumenError, Result};
use lumen::renderer::device::{
    BufferKey, BufferUsage, DrawCall, ProgramKey, RenderDevice, ShaderKey, ShaderStage, TextureDescriptor,
    TextureKey,
};
use base64::Engine;
use slotmap::SlotMap;

// ============================================================================
// RecordingDevice
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedShader {
    pub label: String,
    pub stage: ShaderStage,
    pub source: String,
}

/// A device that performs no GPU work and records every call.
#[derive(Default)]
pub struct RecordingDevice {
    pub shaders: SlotMap<ShaderKey, RecordedShader>,
    pub programs: SlotMap<ProgramKey, (ShaderKey, ShaderKey)>,
    pub buffers: SlotMap<BufferKey, (BufferUsage, Vec<u8>)>,
    pub textures: SlotMap<TextureKey, (u32, u32)>,

    pub compile_calls: usize,
    pub link_calls: usize,
    /// Draws of each finished frame.
    pub frames: Vec<Vec<DrawCall>>,
    pending: Option<Vec<DrawCall>>,

    /// Labels of shader stages whose compilation should fail.
    pub failing_labels: Vec<String>,
    pub size: (u32, u32),
}

/// Routes `log` output to the test harness; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl RecordingDevice {
    pub fn new() -> Self {
        init_logging();
        Self {
            size: (800, 600),
            ..Self::default()
        }
    }

    pub fn last_frame(&self) -> &[DrawCall] {
        self.frames.last().map_or(&[], Vec::as_slice)
    }

    pub fn shader_source(&self, key: ShaderKey) -> &str {
        &self.shaders[key].source
    }

    /// Vertex and fragment WGSL of the program a draw used.
    pub fn program_sources(&self, program: ProgramKey) -> (&str, &str) {
        let (vs, fs) = self.programs[program];
        (self.shader_source(vs), self.shader_source(fs))
    }
}

impl RenderDevice for RecordingDevice {
    fn compile_shader(&mut self, label: &str, stage: ShaderStage, source: &str) -> Result<ShaderKey> {
        self.compile_calls += 1;
        if self.failing_labels.iter().any(|l| l == label) {
            return Err(LumenError::ShaderCompile {
                label: label.to_string(),
                message: "rejected by test device".to_string(),
            });
        }
        Ok(self.shaders.insert(RecordedShader {
            label: label.to_string(),
            stage,
            source: source.to_string(),
        }))
    }

    fn link_program(&mut self, vertex: ShaderKey, fragment: ShaderKey) -> Result<ProgramKey> {
        self.link_calls += 1;
        if !self.shaders.contains_key(vertex) || !self.shaders.contains_key(fragment) {
            return Err(LumenError::InvalidHandle("shader"));
        }
        Ok(self.programs.insert((vertex, fragment)))
    }

    fn create_buffer(&mut self, _label: &str, usage: BufferUsage, data: &[u8]) -> BufferKey {
        self.buffers.insert((usage, data.to_vec()))
    }

    fn create_texture(&mut self, desc: &TextureDescriptor<'_>) -> TextureKey {
        self.textures.insert((desc.width, desc.height))
    }

    fn begin_frame(&mut self, _clear_color: [f32; 4]) {
        self.pending = Some(Vec::new());
    }

    fn draw(&mut self, call: &DrawCall) {
        if let Some(pending) = &mut self.pending {
            pending.push(call.clone());
        }
    }

    fn end_frame(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.frames.push(pending);
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn max_vertex_attributes(&self) -> usize {
        16
    }

    fn destroy_shader(&mut self, key: ShaderKey) {
        self.shaders.remove(key);
    }

    fn destroy_program(&mut self, key: ProgramKey) {
        self.programs.remove(key);
    }

    fn destroy_buffer(&mut self, key: BufferKey) {
        self.buffers.remove(key);
    }

    fn destroy_texture(&mut self, key: TextureKey) {
        self.textures.remove(key);
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Three positions `(0,0,0) (1,0,0) (0,1,0)` followed by u16 indices `0 1 2` (+2 padding bytes).
pub const TRIANGLE_BUFFER: &str =
    "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA=";

/// One indexed triangle on one node, default material.
pub fn triangle_gltf() -> String {
    format!(
        r#"{{
        "asset": {{ "version": "2.0" }},
        "scene": 0,
        "scenes": [ {{ "nodes": [0] }} ],
        "nodes": [ {{ "mesh": 0 }} ],
        "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }} ] }} ],
        "buffers": [ {{ "byteLength": 44, "uri": "{TRIANGLE_BUFFER}" }} ],
        "bufferViews": [
            {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
            {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
        ],
        "accessors": [
            {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
               "min": [0, 0, 0], "max": [1, 1, 0] }},
            {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
        ]
    }}"#
    )
}

/// The triangle mesh instanced on three nodes at `z = -2`, `z = -5` and
/// `z = 3`, with a blended material.
pub fn blended_instances_gltf() -> String {
    format!(
        r#"{{
        "asset": {{ "version": "2.0" }},
        "scenes": [ {{ "nodes": [0, 1, 2] }} ],
        "nodes": [
            {{ "name": "near", "mesh": 0, "translation": [0, 0, -2] }},
            {{ "name": "far", "mesh": 0, "translation": [0, 0, -5] }},
            {{ "name": "behind", "mesh": 0, "translation": [0, 0, 3] }}
        ],
        "materials": [ {{ "alphaMode": "BLEND", "doubleSided": true }} ],
        "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "material": 0 }} ] }} ],
        "buffers": [ {{ "byteLength": 44, "uri": "{TRIANGLE_BUFFER}" }} ],
        "bufferViews": [ {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }} ],
        "accessors": [
            {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
               "min": [0, 0, 0], "max": [1, 1, 0] }}
        ]
    }}"#
    )
}

/// The indexed triangle with a base color texture whose image is only
/// referenced, never decoded by the loader.
pub fn textured_triangle_gltf() -> String {
    format!(
        r#"{{
        "asset": {{ "version": "2.0" }},
        "scenes": [ {{ "nodes": [0] }} ],
        "nodes": [ {{ "mesh": 0 }} ],
        "materials": [ {{ "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }} ],
        "textures": [ {{ "source": 0 }} ],
        "images": [ {{ "uri": "albedo.png" }} ],
        "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }} ] }} ],
        "buffers": [ {{ "byteLength": 44, "uri": "{TRIANGLE_BUFFER}" }} ],
        "bufferViews": [
            {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
            {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }}
        ],
        "accessors": [
            {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
               "min": [0, 0, 0], "max": [1, 1, 0] }},
            {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
        ]
    }}"#
    )
}

/// The indexed triangle skinned to one joint node translated by `(0, 1, 0)`.
///
/// Buffer layout after the triangle bytes: u8 `JOINTS_0`, f32 `WEIGHTS_0`
/// and one identity inverse bind matrix.
pub fn skinned_triangle_gltf() -> String {
    let mut bin = lumen::assets::decode_data_uri(TRIANGLE_BUFFER).unwrap_or_default();
    bin.extend_from_slice(&[0u8; 12]);
    bin.extend(f32_bytes(&[1.0, 0.0, 0.0, 0.0].repeat(3)));
    bin.extend(f32_bytes(&glam::Mat4::IDENTITY.to_cols_array()));
    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bin)
    );

    format!(
        r#"{{
        "asset": {{ "version": "2.0" }},
        "scenes": [ {{ "nodes": [0, 1] }} ],
        "nodes": [
            {{ "name": "skinned", "mesh": 0, "skin": 0 }},
            {{ "name": "joint", "translation": [0, 1, 0] }}
        ],
        "skins": [ {{ "joints": [1], "inverseBindMatrices": 3 }} ],
        "meshes": [ {{ "primitives": [ {{
            "attributes": {{ "POSITION": 0, "JOINTS_0": 1, "WEIGHTS_0": 2 }}, "indices": 4
        }} ] }} ],
        "buffers": [ {{ "byteLength": {len}, "uri": "{uri}" }} ],
        "bufferViews": [
            {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
            {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }},
            {{ "buffer": 0, "byteOffset": 44, "byteLength": 12 }},
            {{ "buffer": 0, "byteOffset": 56, "byteLength": 48 }},
            {{ "buffer": 0, "byteOffset": 104, "byteLength": 64 }}
        ],
        "accessors": [
            {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
               "min": [0, 0, 0], "max": [1, 1, 0] }},
            {{ "bufferView": 2, "componentType": 5121, "count": 3, "type": "VEC4" }},
            {{ "bufferView": 3, "componentType": 5126, "count": 3, "type": "VEC4" }},
            {{ "bufferView": 4, "componentType": 5126, "count": 1, "type": "MAT4" }},
            {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }}
        ]
    }}"#,
        len = bin.len()
    )
}

/// One opaque triangle at `z = -3` and two blended instances at `z = -2`
/// and `z = -6`, listed blended-first in the scene.
pub fn mixed_opaque_blended_gltf() -> String {
    format!(
        r#"{{
        "asset": {{ "version": "2.0" }},
        "scenes": [ {{ "nodes": [0, 1, 2] }} ],
        "nodes": [
            {{ "name": "glass near", "mesh": 1, "translation": [0, 0, -2] }},
            {{ "name": "wall", "mesh": 0, "translation": [0, 0, -3] }},
            {{ "name": "glass far", "mesh": 1, "translation": [0, 0, -6] }}
        ],
        "materials": [ {{ "alphaMode": "OPAQUE" }}, {{ "alphaMode": "BLEND" }} ],
        "meshes": [
            {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "material": 0 }} ] }},
            {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "material": 1 }} ] }}
        ],
        "buffers": [ {{ "byteLength": 44, "uri": "{TRIANGLE_BUFFER}" }} ],
        "bufferViews": [ {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }} ],
        "accessors": [
            {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
               "min": [0, 0, 0], "max": [1, 1, 0] }}
        ]
    }}"#
    )
}

pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
