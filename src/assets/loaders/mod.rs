//! Asset loaders.

pub mod gltf;
