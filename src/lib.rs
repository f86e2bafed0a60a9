//! # lumen
//!
//! glTF 2.0 scene evaluator and physically based renderer core.
//!
//! - [`assets`]: glTF loading into a pure-data [`GltfAsset`]
//! - [`resources`]: accessors, meshes, materials, textures, uniform values
//! - [`scene`]: node hierarchy, skins, cameras, lights
//! - [`animation`]: keyframe sampling and channel application
//! - [`renderer`]: shader permutation cache, render lists and [`SceneRenderer`]
//! - [`viewer`]: the [`Viewer`] façade

pub mod animation;
pub mod assets;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod utils;
pub mod viewer;

pub use animation::{Animation, Interpolator};
pub use assets::{GltfAsset, GltfLoader};
pub use errors::{LumenError, Result};
pub use renderer::device::RenderDevice;
pub use renderer::settings::{AnimationSelector, CameraSelector, DebugOutput, RenderingOptions, ToneMap};
pub use renderer::{SceneRenderer, WgpuDevice};
pub use resources::{Accessor, Material, Mesh, ShaderDefines};
pub use scene::{Camera, Light, Node, Scene, Skin, UserCamera};
pub use viewer::Viewer;
