//! glTF 2.0 loader.
//!
//! Parses `.gltf` (JSON, embedded or external buffers) and `.glb` files into a
//! [`GltfAsset`]. Only the document is interpreted here; image decoding is
//! left to the host (see [`GltfAsset::set_image`]) and nothing touches the GPU.

use std::fs;
use std::path::Path;

use base64::Engine;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use gltf::json::{self, validation::Checked};

use crate::animation::{Animation, AnimationChannel, AnimationSampler, ChannelTarget, InterpolationMode, TargetPath};
use crate::assets::GltfAsset;
use crate::errors::{LumenError, Result};
use crate::resources::accessor::{Accessor, ComponentType, ElementType, Sparse, SparseIndices, SparseValues};
use crate::resources::buffer::{Buffer, BufferTarget, BufferView};
use crate::resources::material::{AlphaMode, Material, MaterialExtensions, PbrMetallicRoughness, TextureInfo, TextureTransform};
use crate::resources::mesh::{DrawMode, Mesh, MorphTarget, Primitive, Semantic};
use crate::resources::texture::{ImageSlot, ImageSource, Sampler, Texture};
use crate::scene::{Camera, Light, LightKind, Node, Projection, Scene, Skin, Transform};

/// Extensions understood outside the material extension registry.
const BUILTIN_EXTENSIONS: &[&str] = &["KHR_lights_punctual", "KHR_texture_transform"];

/// Decodes a base64 `data:` URI into bytes.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| LumenError::DataUriError(format!("not a data URI: {}", truncate(uri))))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LumenError::DataUriError("missing ',' separator".to_string()))?;
    if !header.ends_with(";base64") {
        return Err(LumenError::DataUriError(format!("unsupported encoding '{header}'")));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

fn truncate(s: &str) -> &str {
    s.get(..32).unwrap_or(s)
}

pub struct GltfLoader {
    material_extensions: MaterialExtensions,
}

impl Default for GltfLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl GltfLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            material_extensions: MaterialExtensions::default(),
        }
    }

    /// Registry used to interpret material extensions; register more handlers
    /// on it before loading.
    pub fn material_extensions_mut(&mut self) -> &mut MaterialExtensions {
        &mut self.material_extensions
    }

    /// Loads a `.gltf` or `.glb` file. External buffers and images are
    /// resolved against the file's directory.
    pub fn load_file(&self, path: &Path) -> Result<GltfAsset> {
        let bytes = fs::read(path)?;
        let base_path = path.parent().unwrap_or(Path::new("./"));
        self.load_slice(&bytes, Some(base_path))
    }

    /// Loads a document from memory. Without `base_path` only embedded
    /// buffers (GLB chunk, data URIs) can be resolved.
    ///
    /// The document is read without validation. Out-of-range references are
    /// logged and dropped (the object that needed them is skipped at render
    /// time); only a missing scene list or an unsupported required extension
    /// fails the load.
    pub fn load_slice(&self, bytes: &[u8], base_path: Option<&Path>) -> Result<GltfAsset> {
        let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
        let root = gltf.document.as_json();

        self.check_extensions(root)?;

        if root.scenes.is_empty() {
            return Err(LumenError::NoScenes);
        }

        let mut asset = GltfAsset {
            base_path: base_path.map(Path::to_path_buf),
            ..GltfAsset::default()
        };

        // 1. 二进制数据
        asset.buffers = load_buffers(root, gltf.blob.as_deref(), base_path)?;
        asset.buffer_views = root.buffer_views.iter().map(|view| load_buffer_view(root, view)).collect();
        asset.accessors = root
            .accessors
            .iter()
            .enumerate()
            .map(|(index, accessor)| load_accessor(root, index, accessor))
            .collect();

        // 2. 纹理与材质
        asset.images = root.images.iter().map(|image| load_image(root, image)).collect();
        asset.samplers = root.samplers.iter().map(load_sampler).collect();
        asset.textures = root
            .textures
            .iter()
            .map(|texture| Texture {
                name: texture.name.clone(),
                source: resolve(texture.source, root.images.len(), "texture source"),
                sampler: texture.sampler.and_then(|s| resolve(s, root.samplers.len(), "texture sampler")),
            })
            .collect();
        asset.materials = root.materials.iter().map(|m| self.load_material(root, m)).collect();
        asset.materials.push(Material::default_material());

        // 3. 几何
        asset.meshes = root.meshes.iter().map(|mesh| load_mesh(root, mesh)).collect();

        // 4. 场景图
        let light_count = punctual_lights(root).len();
        asset.nodes = root.nodes.iter().map(|node| load_node(root, node, light_count)).collect();
        asset.scenes = root
            .scenes
            .iter()
            .map(|scene| Scene {
                name: scene.name.clone(),
                nodes: scene
                    .nodes
                    .iter()
                    .filter_map(|&n| resolve(n, root.nodes.len(), "scene node"))
                    .collect(),
            })
            .collect();
        asset.default_scene = root
            .scene
            .and_then(|s| resolve(s, root.scenes.len(), "default scene"))
            .unwrap_or(0);

        asset.skins = root.skins.iter().map(|skin| load_skin(root, skin)).collect();
        asset.cameras = root.cameras.iter().map(load_camera).collect();
        asset.lights = punctual_lights(root).iter().map(load_light).collect();

        // Cameras and lights remember the node that places them.
        for (index, node) in asset.nodes.iter().enumerate() {
            if let Some(camera) = node.camera.and_then(|c| asset.cameras.get_mut(c)) {
                camera.node = Some(index);
            }
            if let Some(light) = node.light.and_then(|l| asset.lights.get_mut(l)) {
                light.node = Some(index);
            }
        }

        // 5. 动画
        asset.animations = root.animations.iter().map(|anim| load_animation(root, anim)).collect();

        log::info!(
            "Loaded glTF: {} nodes, {} meshes, {} materials, {} animations, {} scenes",
            asset.nodes.len(),
            asset.meshes.len(),
            asset.materials.len() - 1,
            asset.animations.len(),
            asset.scenes.len()
        );

        Ok(asset)
    }

    fn is_supported(&self, extension: &str) -> bool {
        BUILTIN_EXTENSIONS.contains(&extension) || self.material_extensions.supports(extension)
    }

    fn check_extensions(&self, root: &json::Root) -> Result<()> {
        let required_unsupported: Vec<&str> = root
            .extensions_required
            .iter()
            .map(String::as_str)
            .filter(|ext| !self.is_supported(ext))
            .collect();
        if !required_unsupported.is_empty() {
            return Err(LumenError::UnsupportedExtension(required_unsupported.join(", ")));
        }

        let used_unsupported: Vec<&str> = root
            .extensions_used
            .iter()
            .map(String::as_str)
            .filter(|ext| !self.is_supported(ext))
            .collect();
        if !used_unsupported.is_empty() {
            log::warn!(
                "glTF uses unsupported extensions {used_unsupported:?}, the result may not look as authored"
            );
        }
        Ok(())
    }

    fn load_material(&self, root: &json::Root, material: &json::Material) -> Material {
        let pbr = &material.pbr_metallic_roughness;
        let texture_count = root.textures.len();

        // Material 的派生字段是私有的，所以逐个赋值
        let mut mat = Material::default();
        mat.name = material.name.clone();
        mat.pbr_metallic_roughness = Some(PbrMetallicRoughness {
            base_color_factor: Vec4::from_array(pbr.base_color_factor.0),
            metallic_factor: pbr.metallic_factor.0,
            roughness_factor: pbr.roughness_factor.0,
            base_color_texture: pbr.base_color_texture.as_ref().and_then(|info| texture_info(info, texture_count)),
            metallic_roughness_texture: pbr
                .metallic_roughness_texture
                .as_ref()
                .and_then(|info| texture_info(info, texture_count)),
        });
        mat.emissive_factor = Vec3::from_array(material.emissive_factor.0);
        mat.emissive_texture = material
            .emissive_texture
            .as_ref()
            .and_then(|info| texture_info(info, texture_count));
        mat.double_sided = material.double_sided;

        if let Some(normal) = &material.normal_texture
            && let Some(texture) = resolve(normal.index, texture_count, "normal texture")
        {
            let mut info = TextureInfo::new(texture, normal.tex_coord);
            info.scale = normal.scale;
            mat.normal_texture = Some(info);
        }

        if let Some(occlusion) = &material.occlusion_texture
            && let Some(texture) = resolve(occlusion.index, texture_count, "occlusion texture")
        {
            let mut info = TextureInfo::new(texture, occlusion.tex_coord);
            info.scale = occlusion.strength.0;
            mat.occlusion_texture = Some(info);
        }

        match valid(&material.alpha_mode) {
            Some(json::material::AlphaMode::Opaque) => mat.alpha_mode = AlphaMode::Opaque,
            Some(json::material::AlphaMode::Mask) => {
                mat.alpha_mode = AlphaMode::Mask;
                mat.alpha_cutoff = material.alpha_cutoff.map_or(0.5, |cutoff| cutoff.0);
            }
            Some(json::material::AlphaMode::Blend) => mat.alpha_mode = AlphaMode::Blend,
            None => log::warn!("Material {:?}: unknown alphaMode, using OPAQUE", material.name),
        }

        if let Some(extensions) = &material.extensions {
            self.material_extensions.apply_all(&mut mat, &extensions.others);
            mat.drop_dangling_textures(texture_count);
        }

        mat
    }
}

// ============================================================================
// References
// ============================================================================

/// Checks a document reference against the array it points into.
fn resolve<T>(index: json::Index<T>, len: usize, what: &str) -> Option<usize> {
    let value = index.value();
    if value < len {
        Some(value)
    } else {
        log::warn!("{what} {value} is out of range ({len} available), ignoring the reference");
        None
    }
}

fn valid<T>(checked: &Checked<T>) -> Option<&T> {
    match checked {
        Checked::Valid(value) => Some(value),
        Checked::Invalid => None,
    }
}

fn punctual_lights(root: &json::Root) -> &[json::extensions::scene::khr_lights_punctual::Light] {
    root.extensions
        .as_ref()
        .and_then(|ext| ext.khr_lights_punctual.as_ref())
        .map(|ext| ext.lights.as_slice())
        .unwrap_or_default()
}

// ============================================================================
// Binary data
// ============================================================================

fn load_buffers(root: &json::Root, blob: Option<&[u8]>, base_path: Option<&Path>) -> Result<Vec<Buffer>> {
    let mut buffers = Vec::with_capacity(root.buffers.len());
    for (index, buffer) in root.buffers.iter().enumerate() {
        let data = match buffer.uri.as_deref() {
            None => blob
                .map(<[u8]>::to_vec)
                .ok_or_else(|| LumenError::AssetIndexOutOfBounds {
                    context: "GLB binary chunk".to_string(),
                    index,
                })?,
            Some(uri) if uri.starts_with("data:") => decode_data_uri(uri)?,
            Some(uri) => {
                let path = base_path.unwrap_or(Path::new("./")).join(uri);
                log::debug!("Reading buffer {}", path.display());
                fs::read(&path)?
            }
        };

        let declared = buffer.byte_length.0 as usize;
        if data.len() < declared {
            log::warn!("Buffer {index} holds {} bytes, {declared} declared", data.len());
        }

        let mut b = Buffer::new(data);
        b.name = buffer.name.clone();
        buffers.push(b);
    }
    Ok(buffers)
}

fn load_buffer_view(root: &json::Root, view: &json::buffer::View) -> BufferView {
    // An out-of-range buffer is kept as-is; slicing the view then fails and
    // every accessor over it is unreadable.
    let _ = resolve(view.buffer, root.buffers.len(), "bufferView buffer");
    let mut bv = BufferView::new(
        view.buffer.value(),
        view.byte_offset.map_or(0, |o| o.0 as usize),
        view.byte_length.0 as usize,
        view.byte_stride.map_or(0, |s| s.0),
    );
    bv.name = view.name.clone();
    bv.target = view.target.as_ref().and_then(valid).map(|target| match target {
        json::buffer::Target::ArrayBuffer => BufferTarget::ArrayBuffer,
        json::buffer::Target::ElementArrayBuffer => BufferTarget::ElementArrayBuffer,
    });
    bv
}

fn element_type(ty: json::accessor::Type) -> ElementType {
    use json::accessor::Type;
    match ty {
        Type::Scalar => ElementType::Scalar,
        Type::Vec2 => ElementType::Vec2,
        Type::Vec3 => ElementType::Vec3,
        Type::Vec4 => ElementType::Vec4,
        Type::Mat2 => ElementType::Mat2,
        Type::Mat3 => ElementType::Mat3,
        Type::Mat4 => ElementType::Mat4,
    }
}

fn bounds(value: Option<&serde_json::Value>) -> Option<Vec<f32>> {
    let values = value?.as_array()?;
    Some(
        values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect(),
    )
}

fn load_accessor(root: &json::Root, index: usize, accessor: &json::Accessor) -> Accessor {
    let component_type = valid(&accessor.component_type).and_then(|ct| ComponentType::from_gl(ct.0.as_gl_enum()));
    let element = valid(&accessor.type_).copied();
    let (Some(component_type), Some(element)) = (component_type, element) else {
        // 类型无效的 accessor 用无视图的占位代替 (不可读), 其他 accessor 的下标不变
        log::warn!("Accessor {index} has an invalid componentType or type, it is unreadable");
        let mut unreadable = Accessor::new(None, 0, ComponentType::F32, ElementType::Scalar, 0);
        unreadable.name = accessor.name.clone();
        return unreadable;
    };

    // 越界的 bufferView 原样保留: 读取时查不到视图, accessor 即不可读
    let view_count = root.buffer_views.len();
    if let Some(view) = accessor.buffer_view {
        let _ = resolve(view, view_count, "accessor bufferView");
    }

    let mut a = Accessor::new(
        accessor.buffer_view.map(|v| v.value()),
        accessor.byte_offset.map_or(0, |o| o.0 as usize),
        component_type,
        element_type(element),
        accessor.count.0 as usize,
    );
    a.name = accessor.name.clone();
    a.normalized = accessor.normalized;
    a.min = bounds(accessor.min.as_ref());
    a.max = bounds(accessor.max.as_ref());

    if let Some(sparse) = &accessor.sparse {
        let _ = resolve(sparse.indices.buffer_view, view_count, "sparse indices bufferView");
        let _ = resolve(sparse.values.buffer_view, view_count, "sparse values bufferView");
        let index_type = valid(&sparse.indices.component_type)
            .and_then(|ct| ComponentType::from_gl(ct.0.as_gl_enum()))
            .unwrap_or_else(|| {
                log::warn!("Accessor {index}: invalid sparse index type, assuming UNSIGNED_INT");
                ComponentType::U32
            });
        a.sparse = Some(Sparse {
            count: sparse.count.0 as usize,
            indices: SparseIndices {
                buffer_view: sparse.indices.buffer_view.value(),
                byte_offset: sparse.indices.byte_offset.0 as usize,
                component_type: index_type,
            },
            values: SparseValues {
                buffer_view: sparse.values.buffer_view.value(),
                byte_offset: sparse.values.byte_offset.0 as usize,
            },
        });
    }

    a
}

// ============================================================================
// Textures
// ============================================================================

fn load_image(root: &json::Root, image: &json::Image) -> ImageSlot {
    let source = match (image.buffer_view, image.uri.as_deref()) {
        (Some(view), _) => match resolve(view, root.buffer_views.len(), "image bufferView") {
            Some(buffer_view) => ImageSource::BufferView {
                buffer_view,
                mime_type: image.mime_type.as_ref().map(|m| m.0.clone()).unwrap_or_default(),
            },
            None => ImageSource::Missing,
        },
        (None, Some(uri)) => ImageSource::Uri {
            uri: uri.to_string(),
            mime_type: image.mime_type.as_ref().map(|m| m.0.clone()),
        },
        (None, None) => {
            log::warn!("Image {:?} has neither a uri nor a bufferView", image.name);
            ImageSource::Missing
        }
    };
    ImageSlot {
        name: image.name.clone(),
        source,
        decoded: None,
    }
}

fn load_sampler(sampler: &json::texture::Sampler) -> Sampler {
    Sampler::from_gl(
        sampler.mag_filter.as_ref().and_then(valid).map(json::texture::MagFilter::as_gl_enum),
        sampler.min_filter.as_ref().and_then(valid).map(json::texture::MinFilter::as_gl_enum),
        valid(&sampler.wrap_s).copied().unwrap_or_default().as_gl_enum(),
        valid(&sampler.wrap_t).copied().unwrap_or_default().as_gl_enum(),
    )
}

fn texture_info(info: &json::texture::Info, texture_count: usize) -> Option<TextureInfo> {
    let texture = resolve(info.index, texture_count, "material texture")?;
    let mut result = TextureInfo::new(texture, info.tex_coord);
    if let Some(transform) = info.extensions.as_ref().and_then(|ext| ext.texture_transform.as_ref()) {
        result.transform = Some(TextureTransform {
            offset: Vec2::from_array(transform.offset.0),
            rotation: transform.rotation.0,
            scale: Vec2::from_array(transform.scale.0),
            tex_coord: transform.tex_coord,
        });
    }
    Some(result)
}

// ============================================================================
// Meshes
// ============================================================================

fn load_mesh(root: &json::Root, mesh: &json::Mesh) -> Mesh {
    let accessor_count = root.accessors.len();
    let accessor = |index: json::Index<json::Accessor>, what: &str| resolve(index, accessor_count, what);

    let primitives = mesh
        .primitives
        .iter()
        .map(|primitive| {
            let attributes = primitive
                .attributes
                .iter()
                .filter_map(|(semantic, &index)| match semantic {
                    Checked::Valid(semantic) => {
                        accessor(index, "attribute accessor").map(|a| (Semantic::from_name(&semantic.to_string()), a))
                    }
                    Checked::Invalid => {
                        log::warn!("Mesh {:?}: ignoring unknown attribute semantic", mesh.name);
                        None
                    }
                })
                .collect();

            let mut p = Primitive::new(
                attributes,
                primitive.indices.and_then(|i| accessor(i, "index accessor")),
                primitive
                    .material
                    .and_then(|m| resolve(m, root.materials.len(), "primitive material")),
            );
            p.mode = DrawMode::from_gl(valid(&primitive.mode).copied().unwrap_or_default().as_gl_enum());
            p.targets = primitive
                .targets
                .iter()
                .flatten()
                .map(|target| MorphTarget {
                    position: target.positions.and_then(|a| accessor(a, "morph POSITION accessor")),
                    normal: target.normals.and_then(|a| accessor(a, "morph NORMAL accessor")),
                    tangent: target.tangents.and_then(|a| accessor(a, "morph TANGENT accessor")),
                })
                .collect();
            p
        })
        .collect();

    Mesh {
        name: mesh.name.clone(),
        primitives,
        weights: mesh.weights.clone().unwrap_or_default(),
    }
}

// ============================================================================
// Scene graph
// ============================================================================

fn load_node(root: &json::Root, node: &json::Node, light_count: usize) -> Node {
    let transform = match node.matrix {
        Some(matrix) => Transform::from_matrix(Mat4::from_cols_array(&matrix)),
        None => Transform::from_trs(
            Vec3::from_array(node.translation.unwrap_or([0.0; 3])),
            node.rotation.map_or(Quat::IDENTITY, |r| Quat::from_array(r.0)),
            Vec3::from_array(node.scale.unwrap_or([1.0; 3])),
        ),
    };

    let light = node
        .extensions
        .as_ref()
        .and_then(|ext| ext.khr_lights_punctual.as_ref())
        .and_then(|ext| resolve(ext.light, light_count, "node light"));

    Node {
        name: node.name.clone(),
        children: node
            .children
            .iter()
            .flatten()
            .filter_map(|&c| resolve(c, root.nodes.len(), "child node"))
            .collect(),
        transform,
        mesh: node.mesh.and_then(|m| resolve(m, root.meshes.len(), "node mesh")),
        camera: node.camera.and_then(|c| resolve(c, root.cameras.len(), "node camera")),
        skin: node.skin.and_then(|s| resolve(s, root.skins.len(), "node skin")),
        light,
        weights: node.weights.clone(),
        ..Node::default()
    }
}

fn load_skin(root: &json::Root, skin: &json::Skin) -> Skin {
    // Joint order is what JOINTS_0 indexes, so bad joints stay in place and
    // resolve to identity matrices.
    for &joint in &skin.joints {
        let _ = resolve(joint, root.nodes.len(), "skin joint");
    }
    let mut s = Skin::new(
        skin.joints.iter().map(|j| j.value()).collect(),
        skin.inverse_bind_matrices
            .and_then(|a| resolve(a, root.accessors.len(), "inverseBindMatrices accessor")),
    );
    s.name = skin.name.clone();
    s.skeleton = skin.skeleton.and_then(|n| resolve(n, root.nodes.len(), "skin skeleton"));
    s
}

fn load_camera(camera: &json::Camera) -> Camera {
    use json::camera::Type;
    let projection = match (valid(&camera.type_), &camera.perspective, &camera.orthographic) {
        (Some(Type::Perspective), Some(p), _) => Projection::Perspective {
            yfov: p.yfov,
            aspect_ratio: p.aspect_ratio,
            znear: p.znear,
            zfar: p.zfar,
        },
        (Some(Type::Orthographic), _, Some(o)) => Projection::Orthographic {
            xmag: o.xmag,
            ymag: o.ymag,
            znear: o.znear,
            zfar: o.zfar,
        },
        _ => {
            log::warn!("Camera {:?} has no usable projection, using the default perspective", camera.name);
            Projection::default()
        }
    };
    Camera {
        name: camera.name.clone(),
        projection,
        node: None,
    }
}

fn load_light(light: &json::extensions::scene::khr_lights_punctual::Light) -> Light {
    use json::extensions::scene::khr_lights_punctual::Type;
    let kind = match valid(&light.type_) {
        Some(Type::Directional) => LightKind::Directional,
        Some(Type::Point) => LightKind::Point,
        Some(Type::Spot) => {
            let (inner_cone_angle, outer_cone_angle) = light
                .spot
                .as_ref()
                .map_or((0.0, std::f32::consts::FRAC_PI_4), |spot| {
                    (spot.inner_cone_angle, spot.outer_cone_angle)
                });
            LightKind::Spot {
                inner_cone_angle,
                outer_cone_angle,
            }
        }
        None => {
            log::warn!("Light {:?} has an unknown type, treating it as a point light", light.name);
            LightKind::Point
        }
    };
    Light {
        name: light.name.clone(),
        kind,
        color: Vec3::from_array(light.color),
        intensity: light.intensity,
        range: light.range,
        node: None,
    }
}

// ============================================================================
// Animations
// ============================================================================

fn load_animation(root: &json::Root, animation: &json::Animation) -> Animation {
    use json::animation::{Interpolation, Property};

    // Sampler positions are what channels reference, so bad accessors stay
    // in place; `Animation::resolve` drops the channels that use them.
    let samplers = animation
        .samplers
        .iter()
        .map(|sampler| {
            let _ = resolve(sampler.input, root.accessors.len(), "animation input accessor");
            let _ = resolve(sampler.output, root.accessors.len(), "animation output accessor");
            AnimationSampler {
                input: sampler.input.value(),
                output: sampler.output.value(),
                interpolation: match valid(&sampler.interpolation) {
                    Some(Interpolation::Linear) => InterpolationMode::Linear,
                    Some(Interpolation::Step) => InterpolationMode::Step,
                    Some(Interpolation::CubicSpline) => InterpolationMode::CubicSpline,
                    None => {
                        log::warn!("Animation {:?}: unknown interpolation, using LINEAR", animation.name);
                        InterpolationMode::Linear
                    }
                },
            }
        })
        .collect();

    let channels = animation
        .channels
        .iter()
        .filter_map(|channel| {
            let path = match valid(&channel.target.path) {
                Some(Property::Translation) => TargetPath::Translation,
                Some(Property::Rotation) => TargetPath::Rotation,
                Some(Property::Scale) => TargetPath::Scale,
                Some(Property::MorphTargetWeights) => TargetPath::Weights,
                None => {
                    log::warn!("Animation {:?}: ignoring channel with unknown path", animation.name);
                    return None;
                }
            };
            let sampler = resolve(channel.sampler, animation.samplers.len(), "channel sampler")?;
            Some(AnimationChannel {
                sampler,
                target: ChannelTarget {
                    node: resolve(channel.target.node, root.nodes.len(), "channel target node"),
                    path,
                },
            })
        })
        .collect();

    Animation::new(animation.name.clone(), channels, samplers)
}
