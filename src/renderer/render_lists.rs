//! Render Lists
//!
//! Splits the visible primitives of a frame into the two passes:
//!
//! ```text
//! gathered nodes → opaque (document order)
//!                → transparent (camera depth, furthest first)
//! ```
//!
//! Transparent primitives are ordered by the camera-space depth of their
//! centroid (`d = -z_view`); those at or behind the camera (`d <= 0`) are
//! dropped for the frame.

use glam::Mat4;

use crate::assets::GltfAsset;
use crate::scene::camera::{sort_by_depth, view_depth};

/// One primitive instance to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub node: usize,
    pub mesh: usize,
    pub primitive: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RenderLists {
    pub opaque: Vec<DrawItem>,
    pub transparent: Vec<DrawItem>,
}

impl RenderLists {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
    }

    /// Rebuilds both lists from the gathered scene nodes.
    pub fn build(&mut self, asset: &GltfAsset, gathered: &[usize], view: Mat4) {
        self.clear();
        let mut blended = Vec::new();

        for &node_index in gathered {
            let Some(node) = asset.nodes.get(node_index) else {
                continue;
            };
            let Some((mesh_index, mesh)) = node.mesh.and_then(|m| asset.meshes.get(m).map(|mesh| (m, mesh)))
            else {
                continue;
            };

            for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                if primitive.skip() {
                    continue;
                }

                let item = DrawItem {
                    node: node_index,
                    mesh: mesh_index,
                    primitive: primitive_index,
                };

                let is_blended = asset
                    .materials
                    .get(primitive.material_index())
                    .is_some_and(|material| material.is_blended());

                if is_blended {
                    let depth = view_depth(view, node.world_matrix(), primitive.centroid());
                    blended.push((depth, item));
                } else {
                    self.opaque.push(item);
                }
            }
        }

        self.transparent = sort_by_depth(blended).into_iter().map(|(_, item)| item).collect();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
