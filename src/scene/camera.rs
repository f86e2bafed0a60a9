//! Cameras.
//!
//! [`Camera`] is an authored glTF camera bound to the node that references it.
//! [`UserCamera`] is the interactive orbit camera the viewer falls back to.
//! Projections follow wgpu's clip-space convention (depth in `[0, 1]`).

use glam::{Mat4, Quat, Vec3};

use crate::scene::node::Node;
use crate::scene::scene::Extents;

pub const DEFAULT_ZNEAR: f32 = 0.01;
pub const DEFAULT_ZFAR: f32 = 10000.0;
pub const DEFAULT_YFOV: f32 = 45.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        yfov: f32,
        /// `None` uses the surface aspect ratio.
        aspect_ratio: Option<f32>,
        znear: f32,
        /// `None` is an infinite far plane.
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        znear: f32,
        zfar: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective {
            yfov: DEFAULT_YFOV,
            aspect_ratio: None,
            znear: DEFAULT_ZNEAR,
            zfar: Some(DEFAULT_ZFAR),
        }
    }
}

impl Projection {
    #[must_use]
    pub fn matrix(&self, surface_aspect: f32) -> Mat4 {
        match *self {
            Self::Perspective {
                yfov,
                aspect_ratio,
                znear,
                zfar,
            } => {
                let aspect = aspect_ratio.unwrap_or(surface_aspect);
                match zfar {
                    Some(zfar) => Mat4::perspective_rh(yfov, aspect, znear, zfar),
                    None => Mat4::perspective_infinite_rh(yfov, aspect, znear),
                }
            }
            Self::Orthographic {
                xmag,
                ymag,
                znear,
                zfar,
            } => {
                let mut m = Mat4::IDENTITY;
                m.x_axis.x = 1.0 / xmag;
                m.y_axis.y = 1.0 / ymag;
                m.z_axis.z = 1.0 / (znear - zfar);
                m.w_axis.z = znear / (znear - zfar);
                m
            }
        }
    }
}

/// An authored glTF camera.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    pub name: Option<String>,
    pub projection: Projection,
    /// Node that references this camera; resolved after loading.
    pub node: Option<usize>,
}

impl Camera {
    #[must_use]
    pub fn projection_matrix(&self, surface_aspect: f32) -> Mat4 {
        self.projection.matrix(surface_aspect)
    }

    #[must_use]
    pub fn position(&self, nodes: &[Node]) -> Vec3 {
        self.node_of(nodes)
            .map_or(Vec3::ZERO, Node::world_translation)
    }

    /// World rotation of the camera node with scale removed.
    #[must_use]
    pub fn rotation(&self, nodes: &[Node]) -> Quat {
        self.node_of(nodes)
            .map_or(Quat::IDENTITY, |node| {
                let (_, rotation, _) = node.world_matrix().to_scale_rotation_translation();
                rotation.normalize()
            })
    }

    /// Looks from the node position along its local `-Z`, with `+Y` up.
    #[must_use]
    pub fn view_matrix(&self, nodes: &[Node]) -> Mat4 {
        let position = self.position(nodes);
        let direction = self.rotation(nodes) * Vec3::NEG_Z;
        look_at(position, position + direction)
    }

    fn node_of<'a>(&self, nodes: &'a [Node]) -> Option<&'a Node> {
        self.node.and_then(|i| nodes.get(i))
    }
}

fn look_at(eye: Vec3, target: Vec3) -> Mat4 {
    let forward = (target - eye).normalize_or_zero();
    if forward == Vec3::ZERO {
        return Mat4::from_translation(-eye);
    }
    // Looking straight up or down: +Y no longer spans a basis with `forward`.
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Mat4::look_at_rh(eye, target, up)
}

/// Interactive orbit camera.
///
/// The eye sits at `target + zoom · dir`, where `dir` is `+Z` rotated by
/// `-y_rot` around X and then by `-x_rot` around Y.
#[derive(Debug, Clone)]
pub struct UserCamera {
    pub target: Vec3,
    pub x_rot: f32,
    pub y_rot: f32,
    pub zoom: f32,
    pub zoom_factor: f32,
    pub rotate_speed: f32,
    pub scale_factor: f32,

    pub yfov: f32,
    pub znear: f32,
    pub zfar: f32,
    pub aspect_ratio: f32,
}

impl Default for UserCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            x_rot: 0.0,
            y_rot: 0.0,
            zoom: 1.0,
            zoom_factor: 1.04,
            rotate_speed: 1.0 / 180.0,
            scale_factor: 1.0,
            yfov: DEFAULT_YFOV,
            znear: DEFAULT_ZNEAR,
            zfar: DEFAULT_ZFAR,
            aspect_ratio: 16.0 / 9.0,
        }
    }
}

impl UserCamera {
    fn to_local_rotation(&self, v: Vec3) -> Vec3 {
        Quat::from_rotation_y(-self.x_rot) * (Quat::from_rotation_x(-self.y_rot) * v)
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.target + self.to_local_rotation(Vec3::Z) * self.zoom
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        look_at(self.position(), self.target)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.yfov, self.aspect_ratio, self.znear, self.zfar)
    }

    /// Orbits by a pointer delta; pitch is clamped just short of the poles.
    pub fn rotate(&mut self, x: f32, y: f32) {
        let y_max = std::f32::consts::FRAC_PI_2 - 0.01;
        self.x_rot += x * self.rotate_speed;
        self.y_rot = (self.y_rot + y * self.rotate_speed).clamp(-y_max, y_max);
    }

    /// Positive values move away from the target, others move closer.
    pub fn zoom_in(&mut self, value: f32) {
        if value > 0.0 {
            self.zoom *= self.zoom_factor;
        } else {
            self.zoom /= self.zoom_factor;
        }
    }

    pub fn pan(&mut self, x: f32, y: f32) {
        let move_speed = 1.0 / (self.scale_factor * 200.0);
        let left = self.to_local_rotation(Vec3::NEG_X) * (x * move_speed);
        let up = self.to_local_rotation(Vec3::Y) * (y * move_speed);
        self.target += up + left;
    }

    pub fn reset(&mut self, extents: &Extents) {
        self.x_rot = 0.0;
        self.y_rot = 0.0;
        self.fit_view_to_scene(extents);
    }

    /// Centers the target on `extents` and backs off until they fit the view.
    pub fn fit_view_to_scene(&mut self, extents: &Extents) {
        self.target = (extents.min + extents.max) * 0.5;
        let max_axis_length = (extents.max.x - extents.min.x).max(extents.max.y - extents.min.y);
        self.zoom = self.fitting_zoom(max_axis_length);
    }

    #[must_use]
    pub fn fitting_zoom(&self, axis_length: f32) -> f32 {
        let yfov = self.yfov;
        let xfov = self.yfov * self.aspect_ratio;

        let y_zoom = axis_length / 2.0 / (yfov / 2.0).tan();
        let x_zoom = axis_length / 2.0 / (xfov / 2.0).tan();

        x_zoom.max(y_zoom)
    }
}

/// Camera-space depth of `point` (in the model space of `world`): `-z_view`.
#[must_use]
pub fn view_depth(view: Mat4, world: Mat4, point: Vec3) -> f32 {
    -(view * world).transform_point3(point).z
}

/// Drops entries at or behind the camera (`depth <= 0`) and orders the rest
/// furthest first. The sort is stable, so equal depths keep their order.
#[must_use]
pub fn sort_by_depth<T>(mut items: Vec<(f32, T)>) -> Vec<(f32, T)> {
    items.retain(|(depth, _)| *depth > 0.0);
    items.sort_by(|a, b| b.0.total_cmp(&a.0));
    items
}
