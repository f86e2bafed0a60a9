use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl InterpolationMode {
    /// Values stored per keyframe (CUBICSPLINE stores in-tangent, value, out-tangent).
    #[must_use]
    pub const fn values_per_key(self) -> usize {
        match self {
            Self::CubicSpline => 3,
            _ => 1,
        }
    }
}

/// Key times plus decoded values of one sampler.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>, // For CubicSpline, length is times.len() * 3
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Decodes flat output scalars with `stride` scalars per value.
    #[must_use]
    pub fn from_scalars(times: Vec<f32>, scalars: &[f32], stride: usize, interpolation: InterpolationMode) -> Self {
        let values = if stride == 0 {
            Vec::new()
        } else {
            scalars.chunks_exact(stride).map(T::from_scalars).collect()
        };
        Self::new(times, values, interpolation)
    }

    /// `true` when times and values cannot be sampled together.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.times.is_empty() || self.values.len() < self.times.len() * self.interpolation.values_per_key()
    }

    #[must_use]
    pub fn last_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// For Linear/Step, the index is used directly.
    /// For CubicSpline, the value is at index * 3 + 1.
    fn value_at(&self, index: usize) -> &T {
        match self.interpolation {
            InterpolationMode::CubicSpline => &self.values[index * 3 + 1],
            _ => &self.values[index],
        }
    }
}

/// Per-channel sampling cursor.
///
/// Remembers the previous key and time so forward playback resumes the key
/// search where the last frame stopped. The cursor never changes results.
#[derive(Debug, Clone, Default)]
pub struct Interpolator {
    prev_key: usize,
    prev_t: f32,
}

impl Interpolator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.prev_key = 0;
        self.prev_t = 0.0;
    }

    /// Samples `track` at `t` seconds, looping over the track's key range.
    ///
    /// Returns `None` for malformed tracks (no keys, or fewer values than keys).
    pub fn interpolate<T: Interpolatable>(&mut self, track: &KeyframeTrack<T>, t: f32) -> Option<T> {
        if track.is_malformed() {
            return None;
        }

        let times = &track.times;
        let last = times.len() - 1;

        // No interpolation for single keyframe animations.
        if last == 0 {
            return Some(track.value_at(0).clone());
        }

        // Wrap t around so the animation loops; never earlier than the first key.
        let t = (t % times[last]).max(times[0]);

        if self.prev_t > t {
            self.prev_key = 0;
        }
        self.prev_t = t;

        let start = self.prev_key.min(last);
        let next_key = (start..=last)
            .find(|&i| t <= times[i])
            .unwrap_or(last)
            .clamp(1, last);
        let prev_key = next_key - 1;
        self.prev_key = prev_key;

        let key_delta = times[next_key] - times[prev_key];
        let tn = if key_delta > 1e-6 {
            ((t - times[prev_key]) / key_delta).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Landing exactly on a key returns that key.
        if tn >= 1.0 {
            return Some(track.value_at(next_key).clone());
        }

        let value = match track.interpolation {
            InterpolationMode::Step => track.value_at(prev_key).clone(),
            InterpolationMode::Linear => {
                T::interpolate_linear(track.value_at(prev_key), track.value_at(next_key), tn)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = prev_key * 3;
                let i_next = next_key * 3;

                let v0 = &track.values[i_prev + 1];
                let out_tangent0 = &track.values[i_prev + 2];
                let in_tangent1 = &track.values[i_next];
                let v1 = &track.values[i_next + 1];

                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, tn, key_delta)
            }
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn cursor_resets_when_time_goes_backwards() {
        let track = KeyframeTrack::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0f32, 1.0, 2.0, 3.0], InterpolationMode::Linear);
        let mut interpolator = Interpolator::new();

        assert_eq!(interpolator.interpolate(&track, 2.5), Some(2.5));
        assert_eq!(interpolator.interpolate(&track, 0.5), Some(0.5));
    }

    #[test]
    fn malformed_track_yields_none() {
        let track: KeyframeTrack<Vec3> = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO], InterpolationMode::Linear);
        assert!(Interpolator::new().interpolate(&track, 0.5).is_none());
    }

    #[test]
    fn from_scalars_chunks_by_stride() {
        let track: KeyframeTrack<Vec3> = KeyframeTrack::from_scalars(
            vec![0.0, 1.0],
            &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0],
            3,
            InterpolationMode::Step,
        );
        assert_eq!(track.values, [Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)]);
    }
}
