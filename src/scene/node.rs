use glam::{Mat4, Vec3};

use crate::scene::transform::Transform;

/// A scene-graph node (glTF `node`).
///
/// # Hierarchy
///
/// Children are indices into the asset's node list. glTF guarantees each node
/// has at most one parent, but several scenes may share the same subtrees.
///
/// # Transform
///
/// The [`Transform`] holds the local TRS and its memoized matrix. The world,
/// inverse-world and normal matrices are written by the transform system and
/// are only meaningful after a completed walk.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,

    // === Hierarchy ===
    pub children: Vec<usize>,

    // === Spatial Data ===
    pub transform: Transform,

    // === Components ===
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub skin: Option<usize>,
    pub light: Option<usize>,
    /// Authored per-instance morph weights.
    pub weights: Option<Vec<f32>>,

    // === Evaluated state ===
    pub(crate) world_matrix: Mat4,
    pub(crate) inverse_world_matrix: Mat4,
    pub(crate) normal_matrix: Mat4,
    /// `false` when the last world matrix was singular.
    pub(crate) invertible: bool,
    /// Live morph weights (written by WEIGHTS animation channels).
    pub morph_weights: Vec<f32>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            children: Vec::new(),
            transform: Transform::new(),
            mesh: None,
            camera: None,
            skin: None,
            light: None,
            weights: None,
            world_matrix: Mat4::IDENTITY,
            inverse_world_matrix: Mat4::IDENTITY,
            normal_matrix: Mat4::IDENTITY,
            invertible: true,
            morph_weights: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// Inverse of the world matrix, identity when it is singular.
    #[inline]
    #[must_use]
    pub fn inverse_world_matrix(&self) -> Mat4 {
        self.inverse_world_matrix
    }

    /// `transpose(inverse(world))`, identity when the world matrix is singular.
    #[inline]
    #[must_use]
    pub fn normal_matrix(&self) -> Mat4 {
        self.normal_matrix
    }

    #[inline]
    #[must_use]
    pub fn is_invertible(&self) -> bool {
        self.invertible
    }

    /// World-space position of the node's origin.
    #[must_use]
    pub fn world_translation(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    /// Sets the live morph weights from node weights, else `mesh_weights`,
    /// else zeros, sized to `target_count`.
    pub fn init_morph_weights(&mut self, mesh_weights: &[f32], target_count: usize) {
        let source = self.weights.as_deref().unwrap_or(mesh_weights);
        self.morph_weights = (0..target_count)
            .map(|i| source.get(i).copied().unwrap_or(0.0))
            .collect();
    }

    /// Writes the world matrix and derives the inverse and normal matrices.
    pub(crate) fn set_world_matrix(&mut self, world: Mat4) {
        self.world_matrix = world;
        // 只在逆矩阵溢出 (inf/NaN) 时回退, 极小的均匀缩放仍然可逆
        let det = world.determinant();
        let inverse = if det != 0.0 && det.is_finite() { world.inverse() } else { Mat4::NAN };
        if inverse.is_finite() {
            self.inverse_world_matrix = inverse;
            self.normal_matrix = inverse.transpose();
            self.invertible = true;
        } else {
            self.inverse_world_matrix = Mat4::IDENTITY;
            self.normal_matrix = Mat4::IDENTITY;
            self.invertible = false;
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_uniform_scale_stays_invertible() {
        let mut node = Node::new();
        let world = Mat4::from_scale(Vec3::splat(1e-5));
        node.set_world_matrix(world);
        assert!(node.is_invertible());
        let product = world * node.inverse_world_matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn singular_world_falls_back_to_identity() {
        let mut node = Node::new();
        node.set_world_matrix(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        assert!(!node.is_invertible());
        assert_eq!(node.inverse_world_matrix(), Mat4::IDENTITY);
        assert_eq!(node.normal_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn morph_weights_prefer_node_weights() {
        let mut node = Node::new();
        node.init_morph_weights(&[0.5, 0.25], 3);
        assert_eq!(node.morph_weights, [0.5, 0.25, 0.0]);

        node.weights = Some(vec![1.0]);
        node.init_morph_weights(&[0.5, 0.25], 2);
        assert_eq!(node.morph_weights, [1.0, 0.0]);
    }
}
