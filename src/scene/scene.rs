//! Scenes: root lists over the shared node graph.

use glam::Vec3;

use crate::resources::accessor::Accessor;
use crate::resources::mesh::Mesh;
use crate::scene::node::Node;

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min: Vec3,
    pub max: Vec3,
}

impl Extents {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn expand(&mut self, other: &Extents) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

impl Scene {
    #[must_use]
    pub fn new(nodes: Vec<usize>) -> Self {
        Self { name: None, nodes }
    }

    /// Every node reachable from the roots, parents before children, in
    /// document order.
    #[must_use]
    pub fn gather_nodes(&self, nodes: &[Node]) -> Vec<usize> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut visited = vec![false; nodes.len()];
        let mut stack: Vec<usize> = self.nodes.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            let Some(node) = nodes.get(index) else {
                continue;
            };
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            out.push(index);
            stack.extend(node.children.iter().rev().copied());
        }

        out
    }

    #[must_use]
    pub fn includes_node(&self, nodes: &[Node], index: usize) -> bool {
        let mut visited = vec![false; nodes.len()];
        let mut stack = self.nodes.clone();

        while let Some(current) = stack.pop() {
            if current == index {
                return true;
            }
            let Some(node) = nodes.get(current) else {
                continue;
            };
            if std::mem::replace(&mut visited[current], true) {
                continue;
            }
            stack.extend_from_slice(&node.children);
        }

        false
    }

    /// World-space bounds of the scene's meshes.
    ///
    /// Each primitive contributes the bounding sphere of its transformed
    /// `POSITION` min/max, boxed. Requires world matrices to be current.
    #[must_use]
    pub fn extents(&self, nodes: &[Node], meshes: &[Mesh], accessors: &[Accessor]) -> Extents {
        let mut extents = Extents::EMPTY;

        for index in self.gather_nodes(nodes) {
            let node = &nodes[index];
            let Some(mesh) = node.mesh.and_then(|m| meshes.get(m)) else {
                continue;
            };

            for primitive in &mesh.primitives {
                let Some(accessor) = primitive.position_accessor().and_then(|a| accessors.get(a)) else {
                    continue;
                };
                let (Some(min), Some(max)) = (&accessor.min, &accessor.max) else {
                    continue;
                };
                if min.len() < 3 || max.len() < 3 {
                    continue;
                }

                let world = node.world_matrix();
                let box_min = world.transform_point3(Vec3::new(min[0], min[1], min[2]));
                let box_max = world.transform_point3(Vec3::new(max[0], max[1], max[2]));
                let center = (box_min + box_max) * 0.5;
                let radius = (box_max - center).length();

                extents.expand(&Extents {
                    min: center - Vec3::splat(radius),
                    max: center + Vec3::splat(radius),
                });
            }
        }

        extents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<Node> {
        // 0 -> [1, 2], 2 -> [3], 4 is detached
        let mut nodes: Vec<Node> = (0..5).map(|_| Node::new()).collect();
        nodes[0].children = vec![1, 2];
        nodes[2].children = vec![3];
        nodes
    }

    #[test]
    fn gather_nodes_is_depth_first_in_document_order() {
        let nodes = tree();
        let scene = Scene::new(vec![0]);
        assert_eq!(scene.gather_nodes(&nodes), [0, 1, 2, 3]);
    }

    #[test]
    fn includes_node_only_for_reachable_nodes() {
        let nodes = tree();
        let scene = Scene::new(vec![0]);
        assert!(scene.includes_node(&nodes, 3));
        assert!(!scene.includes_node(&nodes, 4));
    }

    #[test]
    fn empty_scene_has_empty_extents() {
        let scene = Scene::new(vec![]);
        assert!(scene.extents(&[], &[], &[]).is_empty());
    }
}
