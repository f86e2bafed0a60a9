//! Scene graph: nodes, transforms, skins, cameras, lights and scenes.
//!
//! Nodes live in one flat list owned by the asset; scenes are root lists over
//! that list, so several scenes may share subtrees.

pub mod camera;
pub mod light;
pub mod node;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::{Camera, Projection, UserCamera, sort_by_depth, view_depth};
pub use light::{Light, LightKind};
pub use node::Node;
pub use scene::{Extents, Scene};
pub use skeleton::{Skin, SkinMatrices};
pub use transform::Transform;
pub use transform_system::update_hierarchy;
