use glam::{Quat, Vec3, Vec4};
use smallvec::SmallVec;

use crate::resources::mesh::MAX_MORPH_TARGETS;

/// Hermite basis weights `(s0, s1, s2, s3)` for `v0`, `Δ·b0`, `v1`, `Δ·a1`.
#[inline]
fn hermite(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;

    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;
    (s0, s1, s2, s3)
}

/// A keyframe value that can be sampled between keys.
pub trait Interpolatable: Clone + Sized {
    /// Builds a value from its scalars in an output accessor.
    fn from_scalars(scalars: &[f32]) -> Self;

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

impl Interpolatable for f32 {
    fn from_scalars(scalars: &[f32]) -> Self {
        scalars.first().copied().unwrap_or(0.0)
    }

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start * (1.0 - t) + end * t
    }

    fn interpolate_cubic(v0: &Self, out_tangent0: &Self, in_tangent1: &Self, v1: &Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite(t);
        s0 * v0 + s1 * (out_tangent0 * dt) + s2 * v1 + s3 * (in_tangent1 * dt)
    }
}

impl Interpolatable for Vec3 {
    fn from_scalars(scalars: &[f32]) -> Self {
        let get = |i: usize| scalars.get(i).copied().unwrap_or(0.0);
        Vec3::new(get(0), get(1), get(2))
    }

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        *start * (1.0 - t) + *end * t
    }

    fn interpolate_cubic(v0: &Self, out_tangent0: &Self, in_tangent1: &Self, v1: &Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite(t);
        *v0 * s0 + *out_tangent0 * dt * s1 + *v1 * s2 + *in_tangent1 * dt * s3
    }
}

impl Interpolatable for Quat {
    fn from_scalars(scalars: &[f32]) -> Self {
        let get = |i: usize| scalars.get(i).copied().unwrap_or(0.0);
        Quat::from_xyzw(get(0), get(1), get(2), get(3))
    }

    /// Slerp between the normalized endpoints.
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start
            .normalize()
            .slerp(end.normalize(), t)
            .normalize()
    }

    /// Component-wise Hermite, then renormalized.
    fn interpolate_cubic(v0: &Self, out_tangent0: &Self, in_tangent1: &Self, v1: &Self, t: f32, dt: f32) -> Self {
        let (s0, s1, s2, s3) = hermite(t);

        let v0_v = Vec4::from(*v0);
        let v1_v = Vec4::from(*v1);
        let m0_v = Vec4::from(*out_tangent0) * dt;
        let m1_v = Vec4::from(*in_tangent1) * dt;

        let result = v0_v * s0 + m0_v * s1 + v1_v * s2 + m1_v * s3;
        Quat::from_vec4(result).normalize()
    }
}

/// Morph target weights of one mesh instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MorphWeights(pub SmallVec<[f32; MAX_MORPH_TARGETS]>);

impl Interpolatable for MorphWeights {
    fn from_scalars(scalars: &[f32]) -> Self {
        MorphWeights(SmallVec::from_slice(scalars))
    }

    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        MorphWeights(
            start
                .0
                .iter()
                .zip(&end.0)
                .map(|(a, b)| f32::interpolate_linear(a, b, t))
                .collect(),
        )
    }

    fn interpolate_cubic(v0: &Self, out_tangent0: &Self, in_tangent1: &Self, v1: &Self, t: f32, dt: f32) -> Self {
        MorphWeights(
            (0..v0.0.len())
                .map(|i| {
                    let at = |w: &Self| w.0.get(i).copied().unwrap_or(0.0);
                    f32::interpolate_cubic(&at(v0), &at(out_tangent0), &at(in_tangent1), &at(v1), t, dt)
                })
                .collect(),
        )
    }
}
