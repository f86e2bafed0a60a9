use glam::{Mat3, Quat, Vec3};

use crate::resources::uniforms::{
    LIGHT_TYPE_DIRECTIONAL, LIGHT_TYPE_POINT, LIGHT_TYPE_SPOT, LightUniform,
};
use crate::scene::node::Node;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Point,
    Spot {
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    },
}

/// A `KHR_lights_punctual` light.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: Option<String>,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    /// `None` is an infinite range.
    pub range: Option<f32>,
    /// Node that references this light; resolved after loading.
    pub node: Option<usize>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            name: None,
            kind: LightKind::Directional,
            color: Vec3::ONE,
            intensity: 1.0,
            range: None,
            node: None,
        }
    }
}

impl Light {
    /// Packs the light for the fragment stage.
    ///
    /// Direction is the node's world rotation (scale removed) applied to `-Z`;
    /// position is the world translation. Without a node the defaults of
    /// [`LightUniform`] are kept.
    #[must_use]
    pub fn to_uniform(&self, nodes: &[Node]) -> LightUniform {
        let mut uniform = LightUniform::default();

        if let Some(node) = self.node.and_then(|i| nodes.get(i)) {
            let world = node.world_matrix();
            let basis = Mat3::from_mat4(world);
            let scale = Vec3::new(
                basis.x_axis.length(),
                basis.y_axis.length(),
                basis.z_axis.length(),
            );
            if scale.min_element() > 0.0 {
                let rotation = Quat::from_mat3(&Mat3::from_cols(
                    basis.x_axis / scale.x,
                    basis.y_axis / scale.y,
                    basis.z_axis / scale.z,
                ))
                .normalize();
                uniform.direction = (rotation * Vec3::NEG_Z).to_array();
            }
            uniform.position = node.world_translation().to_array();
        }

        uniform.range = self.range.unwrap_or(-1.0);
        uniform.color = self.color.to_array();
        uniform.intensity = self.intensity;

        let (inner, outer, light_type) = match self.kind {
            LightKind::Directional => (0.0, std::f32::consts::FRAC_PI_4, LIGHT_TYPE_DIRECTIONAL),
            LightKind::Point => (0.0, std::f32::consts::FRAC_PI_4, LIGHT_TYPE_POINT),
            LightKind::Spot {
                inner_cone_angle,
                outer_cone_angle,
            } => (inner_cone_angle, outer_cone_angle, LIGHT_TYPE_SPOT),
        };
        uniform.inner_cone_cos = inner.cos();
        uniform.outer_cone_cos = outer.cos();
        uniform.light_type = light_type;

        uniform
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;

    #[test]
    fn directional_light_follows_node_rotation() {
        let mut node = Node::new();
        node.set_world_matrix(Mat4::from_scale_rotation_translation(
            Vec3::splat(3.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(1.0, 2.0, 3.0),
        ));
        let light = Light {
            node: Some(0),
            ..Light::default()
        };

        let uniform = light.to_uniform(&[node]);
        let direction = Vec3::from_array(uniform.direction);
        assert!((direction - Vec3::NEG_X).length() < 1e-5);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0]);
        assert_eq!(uniform.range, -1.0);
        assert_eq!(uniform.light_type, LIGHT_TYPE_DIRECTIONAL);
    }

    #[test]
    fn spot_light_cone_cosines() {
        let light = Light {
            kind: LightKind::Spot {
                inner_cone_angle: 0.0,
                outer_cone_angle: std::f32::consts::FRAC_PI_2,
            },
            range: Some(10.0),
            ..Light::default()
        };
        let uniform = light.to_uniform(&[]);
        assert_eq!(uniform.inner_cone_cos, 1.0);
        assert!(uniform.outer_cone_cos.abs() < 1e-6);
        assert_eq!(uniform.range, 10.0);
        assert_eq!(uniform.light_type, LIGHT_TYPE_SPOT);
    }
}
