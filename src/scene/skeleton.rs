use glam::Mat4;

use crate::resources::accessor::AccessorData;
use crate::scene::node::Node;

/// Joint and joint-normal matrices of one skinned node for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinMatrices {
    pub joints: Vec<Mat4>,
    pub joint_normals: Vec<Mat4>,
}

/// A glTF skin.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub name: Option<String>,

    // === Core Data ===
    /// Ordered joint nodes; `joints[i]` is joint index `i` in the vertex data.
    pub joints: Vec<usize>,
    /// Accessor holding one MAT4 per joint; `None` means identity matrices.
    pub inverse_bind_accessor: Option<usize>,
    pub skeleton: Option<usize>,

    // Inverse bind matrices, resolved from the accessor once the asset's
    // buffers are available. Static after loading.
    pub(crate) inverse_bind_matrices: Vec<Mat4>,
}

impl Skin {
    #[must_use]
    pub fn new(joints: Vec<usize>, inverse_bind_accessor: Option<usize>) -> Self {
        Self {
            name: None,
            inverse_bind_matrices: vec![Mat4::IDENTITY; joints.len()],
            joints,
            inverse_bind_accessor,
            skeleton: None,
        }
    }

    /// Loads inverse bind matrices from a deinterlaced accessor view.
    /// Missing entries stay identity.
    pub fn load_inverse_bind_matrices(&mut self, data: &AccessorData) {
        let values = data.to_f32_vec(false);
        self.inverse_bind_matrices = (0..self.joints.len())
            .map(|i| {
                values
                    .get(i * 16..i * 16 + 16)
                    .map_or(Mat4::IDENTITY, Mat4::from_cols_slice)
            })
            .collect();
    }

    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind_matrices
    }

    /// Evaluates the skin for the node that holds the skinned mesh.
    ///
    /// `joint[i] = inverse_world(skinned node) · world(joint_i) · ibm[i]`.
    /// Joint normal matrices are `transpose(inverse(joint[i]))`, identity when
    /// the joint matrix is singular. Missing joint nodes evaluate to identity.
    #[must_use]
    pub fn compute_joint_matrices(&self, nodes: &[Node], skinned_node_inverse: Mat4) -> SkinMatrices {
        let mut out = SkinMatrices {
            joints: Vec::with_capacity(self.joints.len()),
            joint_normals: Vec::with_capacity(self.joints.len()),
        };

        for (i, &joint) in self.joints.iter().enumerate() {
            let Some(joint_node) = nodes.get(joint) else {
                log::warn!("Skin references missing joint node {joint}");
                out.joints.push(Mat4::IDENTITY);
                out.joint_normals.push(Mat4::IDENTITY);
                continue;
            };

            let ibm = self
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Mat4::IDENTITY);

            // IBM first (mesh space -> bone local), then the bone's world
            // transform, then back into the skinned node's space.
            let joint_matrix = skinned_node_inverse * joint_node.world_matrix() * ibm;

            let inverse = joint_matrix.inverse();
            let normal = if joint_matrix.determinant() != 0.0 && inverse.is_finite() {
                inverse.transpose()
            } else {
                Mat4::IDENTITY
            };

            out.joints.push(joint_matrix);
            out.joint_normals.push(normal);
        }

        out
    }
}
