//! wgpu implementation of [`RenderDevice`].
//!
//! Renders into an offscreen `Rgba8Unorm` color target with a depth buffer.
//! Draw calls are recorded between `begin_frame` and `end_frame`; at the end
//! of the frame the uniform blocks of every draw are packed into one arena
//! buffer, pipelines are created for unseen `(program, vertex layout, state)`
//! combinations, and a single render pass is encoded and submitted.

use std::borrow::Cow;
use std::num::NonZeroU64;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use wgpu::util::DeviceExt;

use crate::errors::{LumenError, Result};
use crate::renderer::device::{
    BufferKey, BufferUsage, DrawCall, ProgramKey, RenderDevice, RenderState, ScalarKind, ShaderKey, ShaderStage,
    TextureDescriptor, TextureDimension, TextureKey, VertexFormat,
};
use crate::renderer::pipeline::reflection::{StageReflection, reflect_stage};
use crate::resources::mesh::DrawMode;
use crate::resources::texture::{FilterMode, Sampler, WrapMode};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform blocks are padded to at least this many bytes.
const MIN_UNIFORM_BLOCK: u64 = 16;

struct GpuShader {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
    reflection: StageReflection,
}

struct GpuProgram {
    vertex: ShaderKey,
    fragment: ShaderKey,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

/// Pipelines are specialized per vertex layout and fixed-function state.
#[derive(Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramKey,
    vertex_layout: Vec<(u32, VertexFormat)>,
    state: RenderState,
}

#[derive(Default)]
struct Frame {
    clear_color: wgpu::Color,
    draws: Vec<DrawCall>,
}

pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    width: u32,
    height: u32,
    color_target: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,

    shaders: SlotMap<ShaderKey, GpuShader>,
    programs: SlotMap<ProgramKey, GpuProgram>,
    buffers: SlotMap<BufferKey, wgpu::Buffer>,
    textures: SlotMap<TextureKey, GpuTexture>,
    pipelines: FxHashMap<PipelineKey, wgpu::RenderPipeline>,

    frame: Option<Frame>,
}

impl WgpuDevice {
    /// Creates a headless device rendering into a `width` × `height` target.
    pub fn new_headless(width: u32, height: u32) -> Result<Self> {
        pollster::block_on(Self::new_headless_async(width, height))
    }

    pub async fn new_headless_async(width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LumenError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        log::info!("Using adapter: {}", adapter.get_info().name);
        Ok(Self::from_device(device, queue, width, height))
    }

    /// Wraps an existing device and queue.
    #[must_use]
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, width: u32, height: u32) -> Self {
        let (color_target, color_view, depth_view) = Self::create_targets(&device, width, height);
        Self {
            device,
            queue,
            width: width.max(1),
            height: height.max(1),
            color_target,
            color_view,
            depth_view,
            shaders: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            pipelines: FxHashMap::default(),
            frame: None,
        }
    }

    fn create_targets(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView, wgpu::TextureView) {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Color Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        (color, color_view, depth_view)
    }

    /// Resizes the render target.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (color, color_view, depth_view) = Self::create_targets(&self.device, width, height);
        self.color_target = color;
        self.color_view = color_view;
        self.depth_view = depth_view;
        self.width = width.max(1);
        self.height = height.max(1);
    }

    #[must_use]
    pub fn wgpu_device(&self) -> &wgpu::Device {
        &self.device
    }

    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Color target the frames are rendered into.
    #[must_use]
    pub fn color_target(&self) -> &wgpu::Texture {
        &self.color_target
    }

    // ========================================================================
    // Pipelines
    // ========================================================================

    fn ensure_pipeline(&mut self, call: &DrawCall) -> Option<PipelineKey> {
        let key = PipelineKey {
            program: call.program,
            vertex_layout: call.vertex_buffers.iter().map(|v| (v.location, v.format)).collect(),
            state: call.state,
        };
        if self.pipelines.contains_key(&key) {
            return Some(key);
        }

        let topology = primitive_topology(call.state.mode)?;
        let program = self.programs.get(call.program)?;
        let vertex = self.shaders.get(program.vertex)?;
        let fragment = self.shaders.get(program.fragment)?;

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .vertex_layout
            .iter()
            .map(|&(location, format)| {
                [wgpu::VertexAttribute {
                    format: vertex_format(format),
                    offset: 0,
                    shader_location: location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout> = key
            .vertex_layout
            .iter()
            .zip(&attributes)
            .map(|(&(_, format), attribute)| wgpu::VertexBufferLayout {
                array_stride: format.stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attribute,
            })
            .collect();

        let state = call.state;
        let strip_index_format = matches!(
            topology,
            wgpu::PrimitiveTopology::LineStrip | wgpu::PrimitiveTopology::TriangleStrip
        )
        .then_some(wgpu::IndexFormat::Uint32);

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Primitive Pipeline"),
            layout: Some(&program.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(ShaderStage::Vertex.entry_point()),
                buffers: &buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: Some(ShaderStage::Fragment.entry_point()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(if state.blend {
                        wgpu::BlendState::ALPHA_BLENDING
                    } else {
                        wgpu::BlendState::REPLACE
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format,
                front_face: if state.front_face_cw {
                    wgpu::FrontFace::Cw
                } else {
                    wgpu::FrontFace::Ccw
                },
                cull_mode: state.cull_back.then_some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("Created pipeline for {:?} ({} vertex streams)", state.mode, buffers.len());
        self.pipelines.insert(key.clone(), pipeline);
        Some(key)
    }

    fn create_sampler(&self, sampler: &Sampler) -> wgpu::Sampler {
        self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: address_mode(sampler.wrap_s),
            address_mode_v: address_mode(sampler.wrap_t),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter_mode(sampler.mag_filter),
            min_filter: filter_mode(sampler.min_filter),
            mipmap_filter: match sampler.mipmap_filter {
                Some(FilterMode::Nearest) | None => wgpu::MipmapFilterMode::Nearest,
                Some(FilterMode::Linear) => wgpu::MipmapFilterMode::Linear,
            },
            ..Default::default()
        })
    }
}

// ============================================================================
// RenderDevice
// ============================================================================

impl RenderDevice for WgpuDevice {
    fn compile_shader(&mut self, label: &str, stage: ShaderStage, source: &str) -> Result<ShaderKey> {
        // wgpu reports shader errors asynchronously; validating with naga first
        // turns them into a `Result`.
        let module = naga::front::wgsl::parse_str(source).map_err(|e| LumenError::ShaderCompile {
            label: label.to_string(),
            message: e.emit_to_string(source),
        })?;
        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::default())
            .validate(&module)
            .map_err(|e| LumenError::ShaderCompile {
                label: label.to_string(),
                message: e.emit_to_string(source),
            })?;

        let reflection = reflect_stage(source, stage)?;
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.to_string())),
        });

        Ok(self.shaders.insert(GpuShader {
            module,
            stage,
            reflection,
        }))
    }

    fn link_program(&mut self, vertex: ShaderKey, fragment: ShaderKey) -> Result<ProgramKey> {
        let (Some(vs), Some(fs)) = (self.shaders.get(vertex), self.shaders.get(fragment)) else {
            return Err(LumenError::InvalidHandle("shader"));
        };
        if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
            return Err(LumenError::ProgramLink("stage mismatch".to_string()));
        }

        let uniform_entry = |binding: u32, size: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(u64::from(size)),
            },
            count: None,
        };
        let uniform_layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniforms Layout"),
            entries: &[
                uniform_entry(0, vs.reflection.block_size),
                uniform_entry(1, fs.reflection.block_size),
            ],
        });

        let mut texture_entries = Vec::new();
        let mut samplers: Vec<_> = fs.reflection.textures.values().copied().collect();
        samplers.sort_by_key(|s| s.binding);
        for info in samplers {
            texture_entries.push(wgpu::BindGroupLayoutEntry {
                binding: info.binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: if info.cube {
                        wgpu::TextureViewDimension::Cube
                    } else {
                        wgpu::TextureViewDimension::D2
                    },
                    multisampled: false,
                },
                count: None,
            });
            texture_entries.push(wgpu::BindGroupLayoutEntry {
                binding: info.sampler_binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
        let texture_layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Textures Layout"),
            entries: &texture_entries,
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Program Layout"),
            bind_group_layouts: &[Some(&uniform_layout), Some(&texture_layout)],
            immediate_size: 0,
        });

        Ok(self.programs.insert(GpuProgram {
            vertex,
            fragment,
            uniform_layout,
            texture_layout,
            pipeline_layout,
        }))
    }

    fn create_buffer(&mut self, label: &str, usage: BufferUsage, data: &[u8]) -> BufferKey {
        let usage = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        };
        // 空缓冲区也需要合法的大小
        let contents: Cow<[u8]> = if data.is_empty() {
            Cow::Owned(vec![0; 4])
        } else {
            Cow::Borrowed(data)
        };
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: &contents,
            usage,
        });
        self.buffers.insert(buffer)
    }

    fn create_texture(&mut self, desc: &TextureDescriptor<'_>) -> TextureKey {
        let layers = match desc.dimension {
            TextureDimension::D2 => 1,
            TextureDimension::Cube => 6,
        };
        let size = wgpu::Extent3d {
            width: desc.width.max(1),
            height: desc.height.max(1),
            depth_or_array_layers: layers,
        };
        let format = if desc.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let expected = (size.width * size.height * 4 * layers) as usize;
        if desc.data.len() >= expected {
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &desc.data[..expected],
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * size.width),
                    rows_per_image: Some(size.height),
                },
                size,
            );
        } else {
            log::warn!(
                "Texture '{}' expects {expected} bytes, got {}; left uninitialized",
                desc.label.unwrap_or(""),
                desc.data.len()
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(match desc.dimension {
                TextureDimension::D2 => wgpu::TextureViewDimension::D2,
                TextureDimension::Cube => wgpu::TextureViewDimension::Cube,
            }),
            ..Default::default()
        });
        let sampler = self.create_sampler(&desc.sampler);

        self.textures.insert(GpuTexture {
            _texture: texture,
            view,
            sampler,
        })
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        if self.frame.is_some() {
            log::warn!("begin_frame called twice, dropping the unfinished frame");
        }
        let [r, g, b, a] = clear_color.map(f64::from);
        self.frame = Some(Frame {
            clear_color: wgpu::Color { r, g, b, a },
            draws: Vec::new(),
        });
    }

    fn draw(&mut self, call: &DrawCall) {
        match &mut self.frame {
            Some(frame) => frame.draws.push(call.clone()),
            None => log::warn!("draw called outside of a frame"),
        }
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            log::warn!("end_frame called without begin_frame");
            return;
        };

        // 1. Pipelines
        let mut prepared = Vec::with_capacity(frame.draws.len());
        for call in &frame.draws {
            if primitive_topology(call.state.mode).is_none() {
                log::warn!("Draw mode {:?} is not supported by wgpu, skipping", call.state.mode);
                continue;
            }
            match self.ensure_pipeline(call) {
                Some(key) => prepared.push((call, key)),
                None => log::warn!("Draw references a destroyed program, skipping"),
            }
        }

        // 2. Uniform arena
        let alignment = u64::from(self.device.limits().min_uniform_buffer_offset_alignment);
        let align = |n: u64| n.div_ceil(alignment) * alignment;
        let mut arena: Vec<u8> = Vec::new();
        let mut ranges = Vec::with_capacity(prepared.len());
        for (call, _) in &prepared {
            let mut place = |block: &[u8]| {
                let offset = arena.len() as u64;
                let size = (block.len() as u64).max(MIN_UNIFORM_BLOCK);
                arena.extend_from_slice(block);
                arena.resize(align(offset + size) as usize, 0);
                (offset, size)
            };
            let vertex = place(&call.vertex_uniforms);
            let fragment = place(&call.fragment_uniforms);
            ranges.push((vertex, fragment));
        }
        if arena.is_empty() {
            arena.resize(MIN_UNIFORM_BLOCK as usize, 0);
        }
        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniforms"),
            contents: &arena,
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // 3. Bind groups
        let mut bind_groups = Vec::with_capacity(prepared.len());
        for ((call, _), &((v_offset, v_size), (f_offset, f_size))) in prepared.iter().zip(&ranges) {
            let Some(program) = self.programs.get(call.program) else {
                bind_groups.push(None);
                continue;
            };
            let uniforms = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Draw Uniforms"),
                layout: &program.uniform_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &uniform_buffer,
                            offset: v_offset,
                            size: NonZeroU64::new(v_size),
                        }),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &uniform_buffer,
                            offset: f_offset,
                            size: NonZeroU64::new(f_size),
                        }),
                    },
                ],
            });

            let mut entries = Vec::with_capacity(call.textures.len() * 2);
            let mut complete = true;
            for binding in &call.textures {
                let Some(texture) = self.textures.get(binding.texture) else {
                    complete = false;
                    break;
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: binding.binding,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: binding.sampler_binding,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                });
            }
            if !complete {
                log::warn!("Draw references a destroyed texture, skipping");
                bind_groups.push(None);
                continue;
            }
            let textures = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Draw Textures"),
                layout: &program.texture_layout,
                entries: &entries,
            });
            bind_groups.push(Some((uniforms, textures)));
        }

        // 4. Render pass
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Frame Encoder") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            'draws: for ((call, key), groups) in prepared.iter().zip(&bind_groups) {
                let (Some(pipeline), Some((uniforms, textures))) = (self.pipelines.get(key), groups) else {
                    continue;
                };

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, uniforms, &[]);
                pass.set_bind_group(1, textures, &[]);
                for (slot, binding) in call.vertex_buffers.iter().enumerate() {
                    let Some(buffer) = self.buffers.get(binding.buffer) else {
                        log::warn!("Draw references a destroyed vertex buffer, skipping");
                        continue 'draws;
                    };
                    pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }

                match call.index {
                    Some(index) => {
                        let Some(buffer) = self.buffers.get(index.buffer) else {
                            continue;
                        };
                        pass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..index.count, 0, 0..1);
                    }
                    None => pass.draw(0..call.vertex_count, 0..1),
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn max_vertex_attributes(&self) -> usize {
        let limits = self.device.limits();
        limits.max_vertex_attributes.min(limits.max_vertex_buffers) as usize
    }

    fn destroy_shader(&mut self, key: ShaderKey) {
        self.shaders.remove(key);
    }

    fn destroy_program(&mut self, key: ProgramKey) {
        if self.programs.remove(key).is_some() {
            self.pipelines.retain(|k, _| k.program != key);
        }
    }

    fn destroy_buffer(&mut self, key: BufferKey) {
        if let Some(buffer) = self.buffers.remove(key) {
            buffer.destroy();
        }
    }

    fn destroy_texture(&mut self, key: TextureKey) {
        self.textures.remove(key);
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// `None` for modes wgpu cannot draw (line loops, triangle fans).
fn primitive_topology(mode: DrawMode) -> Option<wgpu::PrimitiveTopology> {
    match mode {
        DrawMode::Points => Some(wgpu::PrimitiveTopology::PointList),
        DrawMode::Lines => Some(wgpu::PrimitiveTopology::LineList),
        DrawMode::LineStrip => Some(wgpu::PrimitiveTopology::LineStrip),
        DrawMode::Triangles => Some(wgpu::PrimitiveTopology::TriangleList),
        DrawMode::TriangleStrip => Some(wgpu::PrimitiveTopology::TriangleStrip),
        DrawMode::LineLoop | DrawMode::TriangleFan => None,
    }
}

fn vertex_format(format: VertexFormat) -> wgpu::VertexFormat {
    match (format.kind, format.components) {
        (ScalarKind::Float, 1) => wgpu::VertexFormat::Float32,
        (ScalarKind::Float, 2) => wgpu::VertexFormat::Float32x2,
        (ScalarKind::Float, 3) => wgpu::VertexFormat::Float32x3,
        (ScalarKind::Float, _) => wgpu::VertexFormat::Float32x4,
        (ScalarKind::Uint, 1) => wgpu::VertexFormat::Uint32,
        (ScalarKind::Uint, 2) => wgpu::VertexFormat::Uint32x2,
        (ScalarKind::Uint, 3) => wgpu::VertexFormat::Uint32x3,
        (ScalarKind::Uint, _) => wgpu::VertexFormat::Uint32x4,
    }
}

fn address_mode(mode: WrapMode) -> wgpu::AddressMode {
    match mode {
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        WrapMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
    }
}

fn filter_mode(mode: FilterMode) -> wgpu::FilterMode {
    match mode {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}
