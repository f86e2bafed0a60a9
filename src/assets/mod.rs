//! Asset container.
//!
//! [`GltfAsset`] is the pure-data result of loading a glTF file: flat lists of
//! every glTF object type, referencing each other by index. Construction is
//! two-phase:
//!
//! 1. [`loaders::gltf`] fills the lists (no GPU involved).
//! 2. [`GltfAsset::init_gpu`] walks the asset once to derive what rendering
//!    needs (primitive attribute bindings, centroids, inverse bind matrices,
//!    decoded animation tracks, initial morph weights).
//!
//! GPU buffers and textures are created lazily by the renderer's
//! [`ResourceManager`](crate::renderer::resource_manager::ResourceManager).

pub mod loaders;

use std::path::PathBuf;
use std::sync::Arc;

use crate::animation::Animation;
use crate::errors::{LumenError, Result};
use crate::renderer::device::RenderDevice;
use crate::renderer::settings::AnimationSelector;
use crate::resources::accessor::{Accessor, AccessorData, AccessorViews, ViewKind};
use crate::resources::buffer::{Buffer, BufferView};
use crate::resources::material::Material;
use crate::resources::mesh::Mesh;
use crate::resources::texture::{Image, ImageSlot, ImageSource, Sampler, Texture};
use crate::scene::{Camera, Light, Node, Scene, Skin, update_hierarchy};

pub use loaders::gltf::{GltfLoader, decode_data_uri};

#[derive(Debug, Default)]
pub struct GltfAsset {
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub accessors: Vec<Accessor>,
    pub meshes: Vec<Mesh>,
    /// Authored materials followed by the default material.
    pub materials: Vec<Material>,
    pub nodes: Vec<Node>,
    pub scenes: Vec<Scene>,
    pub default_scene: usize,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    pub images: Vec<ImageSlot>,
    pub samplers: Vec<Sampler>,
    pub textures: Vec<Texture>,

    /// Materialized accessor views, cached until [`GltfAsset::destroy`].
    pub views: AccessorViews,
    /// Directory external URIs are resolved against.
    pub base_path: Option<PathBuf>,

    initialized: bool,
}

impl GltfAsset {
    /// Index of the material used by primitives without one.
    #[must_use]
    pub fn default_material(&self) -> usize {
        self.materials.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Cached view of an accessor.
    #[must_use]
    pub fn accessor_view(&self, index: usize, kind: ViewKind) -> Option<Arc<AccessorData>> {
        self.views
            .get(index, kind, &self.accessors, &self.buffer_views, &self.buffers)
    }

    /// Second construction phase. Idempotent.
    pub fn init_gpu(&mut self, device: &dyn RenderDevice) {
        if self.initialized {
            return;
        }

        let default_material = self.default_material();
        for material in &mut self.materials[..default_material] {
            material.finalize();
        }

        let max_attributes = device.max_vertex_attributes();
        for mesh_index in 0..self.meshes.len() {
            for primitive_index in 0..self.meshes[mesh_index].primitives.len() {
                self.init_primitive(mesh_index, primitive_index, default_material, max_attributes);
            }
        }

        for skin in &mut self.skins {
            let Some(accessor) = skin.inverse_bind_accessor else {
                continue;
            };
            match self
                .views
                .get(accessor, ViewKind::Deinterlaced, &self.accessors, &self.buffer_views, &self.buffers)
            {
                Some(data) => skin.load_inverse_bind_matrices(&data),
                None => log::warn!("Inverse bind matrices of a skin are unavailable, using identity"),
            }
        }

        for animation in &mut self.animations {
            animation.resolve(&self.accessors, &self.views, &self.buffer_views, &self.buffers);
        }

        for node in &mut self.nodes {
            let Some(mesh) = node.mesh.and_then(|m| self.meshes.get(m)) else {
                continue;
            };
            let target_count = mesh
                .primitives
                .iter()
                .map(|p| p.targets.len())
                .max()
                .unwrap_or(0);
            node.init_morph_weights(&mesh.weights, target_count);
        }

        for scene in &self.scenes {
            update_hierarchy(&mut self.nodes, &scene.nodes, true);
        }

        self.initialized = true;
    }

    fn init_primitive(&mut self, mesh_index: usize, primitive_index: usize, default_material: usize, max_attributes: usize) {
        let primitive = &mut self.meshes[mesh_index].primitives[primitive_index];
        primitive.finalize(default_material, &self.accessors, max_attributes);
        if primitive.skip() {
            log::warn!("Primitive {primitive_index} of mesh {mesh_index} has no POSITION, skipping it");
            return;
        }

        let positions = primitive.position_accessor().and_then(|a| {
            self.views
                .get(a, ViewKind::Deinterlaced, &self.accessors, &self.buffer_views, &self.buffers)
        });
        let Some(positions) = positions else {
            log::warn!("Primitive {primitive_index} of mesh {mesh_index} has unreadable positions, skipping it");
            primitive.mark_unrenderable();
            return;
        };

        let indices = primitive.indices.and_then(|a| {
            self.views
                .get(a, ViewKind::Deinterlaced, &self.accessors, &self.buffer_views, &self.buffers)
        });
        primitive.compute_centroid(&positions, indices.as_deref());
    }

    // ========================================================================
    // Per frame
    // ========================================================================

    /// Applies the selected animations at time `t` (seconds).
    pub fn advance_animations(&mut self, selection: AnimationSelector, t: f32) {
        match selection {
            AnimationSelector::All => {
                for animation in &mut self.animations {
                    animation.advance(&mut self.nodes, t);
                }
            }
            AnimationSelector::Index(i) => match self.animations.get_mut(i) {
                Some(animation) => animation.advance(&mut self.nodes, t),
                None => log::debug!("Animation {i} does not exist"),
            },
        }
    }

    /// Length of the longest animation.
    #[must_use]
    pub fn animation_duration(&self) -> f32 {
        self.animations
            .iter()
            .map(Animation::duration)
            .fold(0.0, f32::max)
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Supplies decoded pixels for an image slot.
    pub fn set_image(&mut self, index: usize, image: Image) -> Result<()> {
        let slot = self.images.get_mut(index).ok_or_else(|| LumenError::AssetIndexOutOfBounds {
            context: "image".to_string(),
            index,
        })?;
        slot.decoded = Some(image);
        Ok(())
    }

    /// Encoded bytes of an image (PNG, JPEG, ...), for the host to decode.
    pub fn encoded_image(&self, index: usize) -> Result<Vec<u8>> {
        let slot = self.images.get(index).ok_or_else(|| LumenError::AssetIndexOutOfBounds {
            context: "image".to_string(),
            index,
        })?;

        match &slot.source {
            ImageSource::BufferView { buffer_view, .. } => self
                .buffer_views
                .get(*buffer_view)
                .and_then(|view| view.slice(&self.buffers))
                .map(<[u8]>::to_vec)
                .ok_or_else(|| LumenError::AssetIndexOutOfBounds {
                    context: "image buffer view".to_string(),
                    index: *buffer_view,
                }),
            ImageSource::Uri { uri, .. } => {
                if uri.starts_with("data:") {
                    decode_data_uri(uri)
                } else {
                    let path = self.base_path.clone().unwrap_or_default().join(uri);
                    Ok(std::fs::read(path)?)
                }
            }
            ImageSource::Missing => Err(LumenError::AssetIndexOutOfBounds {
                context: "image source".to_string(),
                index,
            }),
        }
    }

    /// Drops every cached accessor view. GPU objects are released by the
    /// renderer's resource manager.
    pub fn destroy(&mut self) {
        self.views.clear();
        self.initialized = false;
    }
}
