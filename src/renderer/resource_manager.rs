//! GPU Resource Manager
//!
//! Lazily uploads asset data to the [`RenderDevice`] and owns the resulting
//! handles:
//!
//! - accessor → vertex buffer (tightly packed 32-bit components)
//! - accessor → index buffer (`u32` indices)
//! - (texture, color space) → sampled texture
//!
//! Failed uploads are remembered so a broken accessor or an unresolved image
//! is reported once, not every frame. [`ResourceManager::destroy`] releases
//! every handle exactly once.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::GltfAsset;
use crate::renderer::device::{
    BufferKey, BufferUsage, IndexBinding, RenderDevice, ScalarKind, TextureDescriptor, TextureDimension,
    TextureKey, VertexFormat,
};
use crate::resources::accessor::ViewKind;

// ============================================================================
// Resource Manager
// ============================================================================

#[derive(Default)]
pub struct ResourceManager {
    vertex_buffers: FxHashMap<(usize, ScalarKind), (BufferKey, VertexFormat)>,
    index_buffers: FxHashMap<usize, IndexBinding>,
    /// `(texture index, srgb)` → texture.
    textures: FxHashMap<(usize, bool), TextureKey>,
    /// Host-supplied textures (environment maps, BRDF LUT) by name.
    named_textures: FxHashMap<&'static str, TextureKey>,

    failed_accessors: FxHashSet<usize>,
    failed_textures: FxHashSet<usize>,
}

impl ResourceManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    /// Vertex buffer of an accessor, read as `kind` by the shader.
    pub fn vertex_buffer(
        &mut self,
        device: &mut dyn RenderDevice,
        asset: &GltfAsset,
        accessor_index: usize,
        kind: ScalarKind,
    ) -> Option<(BufferKey, VertexFormat)> {
        if let Some(&cached) = self.vertex_buffers.get(&(accessor_index, kind)) {
            return Some(cached);
        }
        if self.failed_accessors.contains(&accessor_index) {
            return None;
        }

        let Some((accessor, data)) = asset
            .accessors
            .get(accessor_index)
            .zip(asset.accessor_view(accessor_index, ViewKind::Deinterlaced))
        else {
            log::warn!("Accessor {accessor_index} has no data, primitive is not renderable");
            self.failed_accessors.insert(accessor_index);
            return None;
        };

        let components = accessor.arity() as u32;
        let (bytes, format): (Vec<u8>, VertexFormat) = match kind {
            ScalarKind::Float => (
                bytemuck::cast_slice(&data.to_f32_vec(accessor.normalized)).to_vec(),
                VertexFormat::float(components),
            ),
            ScalarKind::Uint => (
                bytemuck::cast_slice(&data.to_u32_vec()).to_vec(),
                VertexFormat::uint(components),
            ),
        };

        let label = accessor
            .name
            .clone()
            .unwrap_or_else(|| format!("accessor {accessor_index}"));
        let key = device.create_buffer(&label, BufferUsage::Vertex, &bytes);
        log::trace!("Uploaded vertex buffer '{label}' ({} bytes)", bytes.len());

        self.vertex_buffers.insert((accessor_index, kind), (key, format));
        Some((key, format))
    }

    /// Index buffer of an accessor, widened to `u32`.
    pub fn index_buffer(
        &mut self,
        device: &mut dyn RenderDevice,
        asset: &GltfAsset,
        accessor_index: usize,
    ) -> Option<IndexBinding> {
        if let Some(&cached) = self.index_buffers.get(&accessor_index) {
            return Some(cached);
        }
        if self.failed_accessors.contains(&accessor_index) {
            return None;
        }

        let Some(data) = asset.accessor_view(accessor_index, ViewKind::Deinterlaced) else {
            log::warn!("Index accessor {accessor_index} has no data, primitive is not renderable");
            self.failed_accessors.insert(accessor_index);
            return None;
        };

        let indices = data.to_u32_vec();
        let buffer = device.create_buffer(
            &format!("indices {accessor_index}"),
            BufferUsage::Index,
            bytemuck::cast_slice(&indices),
        );
        let binding = IndexBinding {
            buffer,
            count: indices.len() as u32,
        };
        self.index_buffers.insert(accessor_index, binding);
        Some(binding)
    }

    // ========================================================================
    // Textures
    // ========================================================================

    /// Texture of the asset, or `None` when its image was never decoded.
    pub fn texture(
        &mut self,
        device: &mut dyn RenderDevice,
        asset: &GltfAsset,
        texture_index: usize,
        srgb: bool,
    ) -> Option<TextureKey> {
        if let Some(&cached) = self.textures.get(&(texture_index, srgb)) {
            return Some(cached);
        }
        if self.failed_textures.contains(&texture_index) {
            return None;
        }

        let texture = asset.textures.get(texture_index);
        let image = texture
            .and_then(|t| t.source)
            .and_then(|source| asset.images.get(source))
            .and_then(|slot| slot.decoded.as_ref());
        let Some(image) = image else {
            log::warn!("Texture {texture_index} has no decoded image, it is not renderable");
            self.failed_textures.insert(texture_index);
            return None;
        };

        let sampler = texture
            .and_then(|t| t.sampler)
            .and_then(|s| asset.samplers.get(s))
            .copied()
            .unwrap_or_default();
        let label = texture
            .and_then(|t| t.name.clone())
            .unwrap_or_else(|| format!("texture {texture_index}"));

        let key = device.create_texture(&TextureDescriptor {
            label: Some(label.as_str()),
            width: image.width,
            height: image.height,
            dimension: TextureDimension::D2,
            data: &image.data,
            srgb,
            sampler,
        });
        self.textures.insert((texture_index, srgb), key);
        Some(key)
    }

    /// Registers a host-supplied texture under a shader sampler name,
    /// releasing whatever was registered there before.
    pub fn set_named_texture(&mut self, device: &mut dyn RenderDevice, name: &'static str, key: TextureKey) {
        if let Some(old) = self.named_textures.insert(name, key)
            && old != key
        {
            device.destroy_texture(old);
        }
    }

    #[must_use]
    pub fn named_texture(&self, name: &str) -> Option<TextureKey> {
        self.named_textures.get(name).copied()
    }

    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.vertex_buffers.len() + self.index_buffers.len()
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Releases everything uploaded for the current asset; host textures stay.
    pub fn release_asset(&mut self, device: &mut dyn RenderDevice) {
        for (_, (key, _)) in self.vertex_buffers.drain() {
            device.destroy_buffer(key);
        }
        for (_, binding) in self.index_buffers.drain() {
            device.destroy_buffer(binding.buffer);
        }
        for (_, key) in self.textures.drain() {
            device.destroy_texture(key);
        }
        self.failed_accessors.clear();
        self.failed_textures.clear();
    }

    /// Releases every handle this manager owns.
    pub fn destroy(&mut self, device: &mut dyn RenderDevice) {
        self.release_asset(device);
        for (_, key) in self.named_textures.drain() {
            device.destroy_texture(key);
        }
    }
}
