//! 核心资源定义模块
//!
//! Scene data that does not depend on the GPU:
//! - Buffer / BufferView: externally owned byte blobs
//! - Accessor: typed views over buffer bytes (with sparse overrides)
//! - Mesh / Primitive: attribute maps and derived shader flags
//! - Material: metallic-roughness factors, textures and derived flags
//! - Texture / Sampler / Image: texture references and host-decoded pixels
//! - ShaderDefines: ordered feature-flag lists
//! - Uniforms: tagged-union uniform values

pub mod accessor;
pub mod buffer;
pub mod material;
pub mod mesh;
pub mod shader_defines;
pub mod texture;
pub mod uniforms;

pub use accessor::{Accessor, AccessorData, AccessorViews, ComponentType, ElementType, Sparse, ViewKind};
pub use buffer::{Buffer, BufferView};
pub use material::{
    AlphaMode, Material, MaterialExtensionHandler, MaterialExtensions, MaterialProperty, PbrMetallicRoughness, TextureInfo,
    TextureSlot, TextureTransform,
};
pub use mesh::{DrawMode, MAX_MORPH_TARGETS, Mesh, MorphTarget, Primitive, Semantic};
pub use shader_defines::ShaderDefines;
pub use texture::{Image, ImageSlot, ImageSource, Sampler, Texture};
pub use uniforms::{LightUniform, UniformValue};
