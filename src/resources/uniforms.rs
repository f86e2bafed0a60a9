//! Uniform values and their WGSL uniform-buffer encoding.
//!
//! Every per-draw uniform is a [`UniformValue`]; the device writes its bytes at
//! the offset the program reflected for the uniform's name. The encoding
//! follows WGSL's uniform address-space layout: `mat3x3` columns are padded to
//! 16 bytes and scalar arrays are declared as `array<vec4<f32>, N>`, so they
//! are packed four per vec4.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Punctual light type codes shared with the shaders.
pub const LIGHT_TYPE_DIRECTIONAL: i32 = 0;
pub const LIGHT_TYPE_POINT: i32 = 1;
pub const LIGHT_TYPE_SPOT: i32 = 2;

/// GPU layout of one entry of `u_Lights` (64 bytes, matches `struct Light`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub direction: [f32; 3],
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    pub inner_cone_cos: f32,
    pub outer_cone_cos: f32,
    pub light_type: i32,
    pub _padding: [f32; 2],
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            direction: [-0.7399, -0.6428, -0.1983],
            range: -1.0,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            position: [0.0, 0.0, 0.0],
            inner_cone_cos: 0.0,
            outer_cone_cos: std::f32::consts::FRAC_PI_4.cos(),
            light_type: LIGHT_TYPE_DIRECTIONAL,
            _padding: [0.0; 2],
        }
    }
}

/// Tagged-union uniform payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Mat4Array(Vec<Mat4>),
    Lights(Vec<LightUniform>),
}

impl UniformValue {
    /// Appends the uniform-layout bytes of this value to `out`.
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        match self {
            Self::Float(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Int(v) => out.extend_from_slice(bytemuck::bytes_of(v)),
            Self::Vec2(v) => out.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec3(v) => out.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Vec4(v) => out.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            Self::Mat3(m) => {
                for col in [m.x_axis, m.y_axis, m.z_axis] {
                    out.extend_from_slice(bytemuck::cast_slice(&col.extend(0.0).to_array()));
                }
            }
            Self::Mat4(m) => out.extend_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
            Self::FloatArray(values) => {
                out.extend_from_slice(bytemuck::cast_slice(values));
                let pad = (4 - values.len() % 4) % 4;
                out.extend(std::iter::repeat_n(0u8, pad * 4));
            }
            Self::Mat4Array(mats) => {
                for m in mats {
                    out.extend_from_slice(bytemuck::cast_slice(&m.to_cols_array()));
                }
            }
            Self::Lights(lights) => out.extend_from_slice(bytemuck::cast_slice(lights)),
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_bytes(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn light_uniform_is_64_bytes() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 64);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let bytes = UniformValue::Mat3(Mat3::IDENTITY).to_bytes();
        assert_eq!(bytes.len(), 48);
        let floats = as_floats(&bytes);
        assert_eq!(&floats[0..4], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&floats[4..8], &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn float_array_packs_into_vec4s() {
        let bytes = UniformValue::FloatArray(vec![0.5; 5]).to_bytes();
        assert_eq!(bytes.len(), 32);
    }
}
