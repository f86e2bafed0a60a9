//! 渲染模块
//!
//! [`SceneRenderer`] turns an evaluated [`GltfAsset`] into draw calls on an
//! injected [`RenderDevice`]:
//!
//! ```text
//! update transforms → gather scene nodes → camera / lights / skins
//!     → render lists (opaque, then transparent back to front)
//!     → per primitive: shader variant → program → bindings → draw
//! ```
//!
//! Everything GPU-side is created lazily on first use and cached: shader
//! variants and programs in [`ShaderCache`], buffers and textures in
//! [`ResourceManager`].

pub mod device;
pub mod pipeline;
pub mod render_lists;
pub mod resource_manager;
pub mod settings;
pub mod uniform_packer;
pub mod wgpu_device;

use glam::{Mat4, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::GltfAsset;
use crate::errors::Result;
use crate::resources::material::MaterialProperty;
use crate::resources::mesh::MAX_MORPH_TARGETS;
use crate::resources::shader_defines::ShaderDefines;
use crate::resources::uniforms::{LightUniform, UniformValue};
use crate::scene::{SkinMatrices, UserCamera, update_hierarchy};

use self::device::{DrawCall, RenderDevice, RenderState, ShaderStage, TextureBinding, TextureKey, VertexBinding};
use self::pipeline::ShaderCache;
use self::render_lists::{DrawItem, RenderLists};
use self::resource_manager::ResourceManager;
use self::settings::{CameraSelector, RenderingOptions};
use self::uniform_packer::{UniformSet, pack_block};

pub use self::device::{BufferKey, ProgramKey, ShaderKey};
pub use self::wgpu_device::WgpuDevice;

/// Sampler names of the image based lighting inputs.
pub const LAMBERTIAN_ENV_SAMPLER: &str = "u_LambertianEnvSampler";
pub const GGX_ENV_SAMPLER: &str = "u_GGXEnvSampler";
pub const GGX_LUT_SAMPLER: &str = "u_GGXLUT";

/// Per-frame values shared by every draw.
struct FrameState {
    view: Mat4,
    view_projection: Mat4,
    camera_position: Vec3,
    lights: Vec<LightUniform>,
    skins: FxHashMap<usize, SkinMatrices>,
    has_environment: bool,
}

/// Frame statistics of the last [`SceneRenderer::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draws: usize,
    pub skipped: usize,
}

pub struct SceneRenderer {
    shaders: ShaderCache,
    resources: ResourceManager,
    lists: RenderLists,
    environment_mip_count: u32,
    /// Programs whose unsupplied uniforms were already reported.
    reported_programs: FxHashSet<ProgramKey>,
    stats: FrameStats,
}

impl SceneRenderer {
    /// Renderer over the embedded shader templates.
    pub fn new() -> Result<Self> {
        Ok(Self::with_shader_cache(ShaderCache::new()?))
    }

    #[must_use]
    pub fn with_shader_cache(shaders: ShaderCache) -> Self {
        Self {
            shaders,
            resources: ResourceManager::new(),
            lists: RenderLists::new(),
            environment_mip_count: 1,
            reported_programs: FxHashSet::default(),
            stats: FrameStats::default(),
        }
    }

    #[must_use]
    pub fn shader_cache(&self) -> &ShaderCache {
        &self.shaders
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    #[must_use]
    pub fn render_lists(&self) -> &RenderLists {
        &self.lists
    }

    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Installs the image based lighting inputs: prefiltered diffuse and
    /// specular cube maps plus the BRDF lookup table. The renderer takes
    /// ownership of the three textures.
    pub fn set_environment(
        &mut self,
        device: &mut dyn RenderDevice,
        lambertian: TextureKey,
        ggx: TextureKey,
        lut: TextureKey,
        mip_count: u32,
    ) {
        self.resources
            .set_named_texture(device, LAMBERTIAN_ENV_SAMPLER, lambertian);
        self.resources.set_named_texture(device, GGX_ENV_SAMPLER, ggx);
        self.resources.set_named_texture(device, GGX_LUT_SAMPLER, lut);
        self.environment_mip_count = mip_count.max(1);
    }

    #[must_use]
    pub fn has_environment(&self) -> bool {
        [LAMBERTIAN_ENV_SAMPLER, GGX_ENV_SAMPLER, GGX_LUT_SAMPLER]
            .iter()
            .all(|name| self.resources.named_texture(name).is_some())
    }

    /// Renders one frame of `asset` as selected by `options`.
    pub fn render(
        &mut self,
        asset: &mut GltfAsset,
        device: &mut dyn RenderDevice,
        options: &RenderingOptions,
        user_camera: &UserCamera,
    ) {
        self.stats = FrameStats::default();
        device.begin_frame(options.clear_color_rgba());

        if !asset.is_initialized() {
            asset.init_gpu(device);
        }

        let Some(scene) = asset.scenes.get(options.scene_index).cloned() else {
            log::warn!("Scene {} does not exist, nothing to render", options.scene_index);
            device.end_frame();
            return;
        };

        update_hierarchy(&mut asset.nodes, &scene.nodes, false);
        let gathered = scene.gather_nodes(&asset.nodes);

        // 相机
        let aspect = device.aspect_ratio();
        let authored_camera = match options.camera {
            CameraSelector::Index(i) => {
                let camera = asset.cameras.get(i);
                if camera.is_none() {
                    log::warn!("Camera {i} does not exist, using the user camera");
                }
                camera
            }
            CameraSelector::User => None,
        };
        let (view, projection, camera_position) = match authored_camera {
            Some(camera) => (
                camera.view_matrix(&asset.nodes),
                camera.projection_matrix(aspect),
                camera.position(&asset.nodes),
            ),
            None => (
                user_camera.view_matrix(),
                user_camera.projection_matrix(),
                user_camera.position(),
            ),
        };

        // 灯光: scene lights, or the default light when none is visible
        let mut lights: Vec<LightUniform> = asset
            .lights
            .iter()
            .filter(|light| light.node.is_some_and(|n| gathered.contains(&n)))
            .map(|light| light.to_uniform(&asset.nodes))
            .collect();
        if lights.is_empty() {
            lights.push(LightUniform::default());
        }

        // 蒙皮
        let mut skins = FxHashMap::default();
        if options.skinning {
            for &index in &gathered {
                let node = &asset.nodes[index];
                let Some(skin) = node.skin.and_then(|s| asset.skins.get(s)) else {
                    continue;
                };
                skins.insert(
                    index,
                    skin.compute_joint_matrices(&asset.nodes, node.inverse_world_matrix()),
                );
            }
        }

        let frame = FrameState {
            view,
            view_projection: projection * view,
            camera_position,
            lights,
            skins,
            has_environment: self.has_environment(),
        };

        let mut lists = std::mem::take(&mut self.lists);
        lists.build(asset, &gathered, frame.view);

        for item in lists.opaque.iter().chain(&lists.transparent) {
            if self.draw_item(asset, device, options, &frame, *item) {
                self.stats.draws += 1;
            } else {
                self.stats.skipped += 1;
            }
        }
        self.lists = lists;

        device.end_frame();
    }

    /// Issues the draw of one primitive. `false` when it was skipped.
    fn draw_item(
        &mut self,
        asset: &GltfAsset,
        device: &mut dyn RenderDevice,
        options: &RenderingOptions,
        frame: &FrameState,
        item: DrawItem,
    ) -> bool {
        let node = &asset.nodes[item.node];
        let primitive = &asset.meshes[item.mesh].primitives[item.primitive];
        let Some(material) = asset.materials.get(primitive.material_index()) else {
            log::warn!("Primitive references missing material {}", primitive.material_index());
            return false;
        };

        // === 着色器变体 ===
        let mut vertex_defines = primitive.defines().clone();
        let skin = frame.skins.get(&item.node);
        if let Some(skin) = skin
            && primitive.has_joints()
            && primitive.has_weights()
        {
            vertex_defines.enable("USE_SKINNING");
            vertex_defines.set("JOINT_COUNT", &skin.joints.len().max(1).to_string());
        }
        let morphing = options.morphing && !primitive.targets.is_empty();
        if morphing {
            vertex_defines.enable("USE_MORPHING");
            vertex_defines.set(
                "WEIGHT_COUNT",
                &primitive.targets.len().min(MAX_MORPH_TARGETS).to_string(),
            );
        }

        let mut fragment_defines: ShaderDefines = material.defines().merged_with(&vertex_defines);
        let light_count = frame.lights.len();
        options.push_fragment_defines(&mut fragment_defines, light_count, frame.has_environment);

        let Self {
            shaders,
            resources,
            reported_programs,
            environment_mip_count,
            ..
        } = self;

        let Some(vertex_hash) = shaders.select_variant(device, primitive.shader_identifier(), &vertex_defines) else {
            return false;
        };
        let Some(fragment_hash) = shaders.select_variant(device, material.shader_identifier(), &fragment_defines)
        else {
            return false;
        };
        let Some(program) = shaders.get_program(device, vertex_hash, fragment_hash) else {
            return false;
        };
        let reflection = &program.reflection;

        // === 顶点属性 ===
        let mut vertex_buffers = Vec::with_capacity(reflection.attributes.len());
        for binding in primitive.bindings() {
            let Some(attribute) = reflection.attribute(&binding.name) else {
                continue;
            };
            let Some((buffer, format)) = resources.vertex_buffer(device, asset, binding.accessor, attribute.format.kind)
            else {
                return false;
            };
            vertex_buffers.push(VertexBinding {
                location: attribute.location,
                buffer,
                format,
            });
        }
        if vertex_buffers.len() < reflection.attributes.len() {
            log::warn!("Program expects vertex inputs the primitive does not provide, skipping it");
            return false;
        }

        let index = match primitive.indices {
            Some(accessor) => match resources.index_buffer(device, asset, accessor) {
                Some(binding) => Some(binding),
                None => return false,
            },
            None => None,
        };
        let vertex_count = primitive
            .position_accessor()
            .and_then(|a| asset.accessors.get(a))
            .map_or(0, |a| a.count as u32);

        // === Uniforms ===
        let world = node.world_matrix();
        let mut uniforms = UniformSet::new();
        uniforms.set("u_ViewProjectionMatrix", UniformValue::Mat4(frame.view_projection));
        uniforms.set("u_ModelMatrix", UniformValue::Mat4(world));
        uniforms.set("u_NormalMatrix", UniformValue::Mat4(node.normal_matrix()));
        if let Some(skin) = skin {
            uniforms.set("u_jointMatrix", UniformValue::Mat4Array(skin.joints.clone()));
            uniforms.set("u_jointNormalMatrix", UniformValue::Mat4Array(skin.joint_normals.clone()));
        }
        if morphing {
            let mut weights = node.morph_weights.clone();
            weights.resize(MAX_MORPH_TARGETS, 0.0);
            uniforms.set("u_morphWeights", UniformValue::FloatArray(weights));
        }

        uniforms.set("u_Camera", UniformValue::Vec3(frame.camera_position));
        uniforms.set("u_Exposure", UniformValue::Float(options.exposure));
        uniforms.set("u_MipCount", UniformValue::Int(*environment_mip_count as i32));
        uniforms.set("u_Lights", UniformValue::Lights(frame.lights.clone()));
        for (property, value) in material.properties() {
            uniforms.set(property.uniform_name(), value.clone());
        }
        // Defaults for members the material leaves out.
        for (property, fallback) in [
            (MaterialProperty::NormalScale, UniformValue::Float(1.0)),
            (MaterialProperty::OcclusionStrength, UniformValue::Float(1.0)),
            (MaterialProperty::AlphaCutoff, UniformValue::Float(0.5)),
            (MaterialProperty::Ior, UniformValue::Float(1.5)),
            (MaterialProperty::BaseColorFactor, UniformValue::Vec4(glam::Vec4::ONE)),
            (MaterialProperty::MetallicFactor, UniformValue::Float(1.0)),
            (MaterialProperty::RoughnessFactor, UniformValue::Float(1.0)),
        ] {
            if uniforms.get(property.uniform_name()).is_none() {
                uniforms.set(property.uniform_name(), fallback);
            }
        }

        let (vertex_uniforms, missing_vertex) = pack_block(reflection, ShaderStage::Vertex, &uniforms);
        let (fragment_uniforms, missing_fragment) = pack_block(reflection, ShaderStage::Fragment, &uniforms);
        if (!missing_vertex.is_empty() || !missing_fragment.is_empty()) && reported_programs.insert(program.key) {
            log::debug!("Uniforms left at zero: {:?}", [missing_vertex, missing_fragment].concat());
        }

        // === 纹理 ===
        let material_textures: FxHashMap<&str, (usize, bool)> = material
            .textures()
            .iter()
            .map(|(slot, info)| (slot.sampler_name(), (info.texture, slot.is_srgb())))
            .collect();

        let mut textures = Vec::with_capacity(reflection.textures.len());
        for (name, info) in &reflection.textures {
            let texture = match material_textures.get(name.as_str()) {
                Some(&(texture_index, srgb)) => resources.texture(device, asset, texture_index, srgb),
                None => resources.named_texture(name),
            };
            // 纹理缺失时跳过整个图元, 不绑定替代纹理
            let Some(texture) = texture else {
                log::warn!("Texture `{name}` is not available, skipping primitive");
                return false;
            };
            textures.push(TextureBinding {
                binding: info.binding,
                sampler_binding: info.sampler_binding,
                texture,
            });
        }
        textures.sort_by_key(|t| t.binding);

        let state = RenderState {
            mode: primitive.mode,
            front_face_cw: world.determinant() < 0.0,
            cull_back: !material.double_sided,
            blend: material.is_blended(),
        };

        device.draw(&DrawCall {
            program: program.key,
            vertex_buffers,
            index,
            vertex_count,
            vertex_uniforms,
            fragment_uniforms,
            textures,
            state,
        });
        true
    }

    /// Releases the GPU objects created for the current asset, keeping
    /// compiled shaders and the environment.
    pub fn release_asset(&mut self, device: &mut dyn RenderDevice) {
        self.resources.release_asset(device);
        self.lists.clear();
    }

    /// Releases every GPU object the renderer owns.
    pub fn destroy(&mut self, device: &mut dyn RenderDevice) {
        self.resources.destroy(device);
        self.shaders.destroy(device);
        self.lists.clear();
        self.reported_programs.clear();
    }
}
