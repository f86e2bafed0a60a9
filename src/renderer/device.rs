//! GPU Device Abstraction
//!
//! [`RenderDevice`] is the injected GPU context: the renderer, the shader
//! cache and the resource manager receive `&mut dyn RenderDevice` explicitly
//! instead of reaching for a global. Every GPU object is addressed through a
//! slotmap key and released through the matching `destroy_*` call.
//!
//! [`WgpuDevice`](crate::renderer::wgpu_device::WgpuDevice) is the production
//! implementation; tests use a recording device.

use slotmap::new_key_type;

use crate::errors::Result;
use crate::resources::mesh::DrawMode;
use crate::resources::texture::Sampler;

new_key_type! {
    /// A compiled shader stage.
    pub struct ShaderKey;
    /// A linked vertex + fragment program.
    pub struct ProgramKey;
    /// A vertex or index buffer.
    pub struct BufferKey;
    /// A sampled texture with its sampler state.
    pub struct TextureKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Templates named `*.vert` are vertex stages, everything else is a fragment stage.
    #[must_use]
    pub fn from_template_name(name: &str) -> Self {
        if name.ends_with(".vert") {
            Self::Vertex
        } else {
            Self::Fragment
        }
    }

    #[must_use]
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "vs_main",
            Self::Fragment => "fs_main",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
}

/// Scalar kind of a vertex stream as the shader sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Float,
    Uint,
}

/// Layout of one tightly packed vertex stream (32-bit components).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    pub kind: ScalarKind,
    pub components: u32,
}

impl VertexFormat {
    #[must_use]
    pub const fn float(components: u32) -> Self {
        Self {
            kind: ScalarKind::Float,
            components,
        }
    }

    #[must_use]
    pub const fn uint(components: u32) -> Self {
        Self {
            kind: ScalarKind::Uint,
            components,
        }
    }

    /// Bytes per vertex.
    #[must_use]
    pub const fn stride(self) -> u64 {
        self.components as u64 * 4
    }
}

/// A vertex buffer bound to a shader input location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexBinding {
    pub location: u32,
    pub buffer: BufferKey,
    pub format: VertexFormat,
}

/// 32-bit index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBinding {
    pub buffer: BufferKey,
    pub count: u32,
}

/// A texture bound at `binding` with its sampler at `sampler_binding` (group 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    pub binding: u32,
    pub sampler_binding: u32,
    pub texture: TextureKey,
}

/// Fixed-function state of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub mode: DrawMode,
    /// Clockwise front faces (mirrored world transform).
    pub front_face_cw: bool,
    /// Back-face culling; disabled for double-sided materials.
    pub cull_back: bool,
    /// Source-alpha / one-minus-source-alpha blending.
    pub blend: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            mode: DrawMode::Triangles,
            front_face_cw: false,
            cull_back: true,
            blend: false,
        }
    }
}

/// Everything a device needs to issue one draw.
///
/// Uniform blocks are packed std140-style byte images of the vertex (group 0,
/// binding 0) and fragment (group 0, binding 1) uniform structs.
#[derive(Debug, Clone, Default)]
pub struct DrawCall {
    pub program: ProgramKey,
    pub vertex_buffers: Vec<VertexBinding>,
    pub index: Option<IndexBinding>,
    pub vertex_count: u32,
    pub vertex_uniforms: Vec<u8>,
    pub fragment_uniforms: Vec<u8>,
    pub textures: Vec<TextureBinding>,
    pub state: RenderState,
}

impl DrawCall {
    /// Number of vertices (or indices) submitted.
    #[must_use]
    pub fn element_count(&self) -> u32 {
        self.index.map_or(self.vertex_count, |i| i.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    #[default]
    D2,
    /// Six faces stored back to back (+X, -X, +Y, -Y, +Z, -Z).
    Cube,
}

/// RGBA8 texture upload request.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    pub label: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub dimension: TextureDimension,
    pub data: &'a [u8],
    pub srgb: bool,
    pub sampler: Sampler,
}

/// The GPU context injected into the renderer.
pub trait RenderDevice {
    /// Compiles one stage from final WGSL source.
    fn compile_shader(&mut self, label: &str, stage: ShaderStage, source: &str) -> Result<ShaderKey>;

    /// Links two compiled stages into a program.
    fn link_program(&mut self, vertex: ShaderKey, fragment: ShaderKey) -> Result<ProgramKey>;

    fn create_buffer(&mut self, label: &str, usage: BufferUsage, data: &[u8]) -> BufferKey;

    fn create_texture(&mut self, desc: &TextureDescriptor<'_>) -> TextureKey;

    fn begin_frame(&mut self, clear_color: [f32; 4]);

    fn draw(&mut self, call: &DrawCall);

    fn end_frame(&mut self);

    /// Drawable size in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Upper bound on vertex inputs of one program.
    fn max_vertex_attributes(&self) -> usize;

    fn destroy_shader(&mut self, key: ShaderKey);

    fn destroy_program(&mut self, key: ProgramKey);

    fn destroy_buffer(&mut self, key: BufferKey);

    fn destroy_texture(&mut self, key: TextureKey);

    /// Width over height of the drawable.
    fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.surface_size();
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }
}
