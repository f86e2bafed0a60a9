use glam::{Quat, Vec3};

use crate::animation::tracks::{InterpolationMode, Interpolator, KeyframeTrack};
use crate::animation::values::MorphWeights;
use crate::resources::accessor::{Accessor, AccessorViews, ViewKind};
use crate::resources::buffer::{Buffer, BufferView};
use crate::scene::node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    /// Scalars per keyframe value; `None` for weights, whose width depends on the mesh.
    #[must_use]
    pub const fn fixed_stride(self) -> Option<usize> {
        match self {
            Self::Translation | Self::Scale => Some(3),
            Self::Rotation => Some(4),
            Self::Weights => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelTarget {
    pub node: Option<usize>,
    pub path: TargetPath,
}

#[derive(Debug, Clone, Copy)]
pub struct AnimationChannel {
    pub sampler: usize,
    pub target: ChannelTarget,
}

/// Input (key times) and output (values) accessors plus interpolation mode.
#[derive(Debug, Clone, Copy)]
pub struct AnimationSampler {
    pub input: usize,
    pub output: usize,
    pub interpolation: InterpolationMode,
}

/// Decoded keyframes of one channel, typed by target path.
#[derive(Debug, Clone)]
pub enum Track {
    Translation(KeyframeTrack<Vec3>),
    Rotation(KeyframeTrack<Quat>),
    Scale(KeyframeTrack<Vec3>),
    Weights(KeyframeTrack<MorphWeights>),
}

impl Track {
    fn times(&self) -> &[f32] {
        match self {
            Track::Translation(t) | Track::Scale(t) => &t.times,
            Track::Rotation(t) => &t.times,
            Track::Weights(t) => &t.times,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub name: Option<String>,
    pub channels: Vec<AnimationChannel>,
    pub samplers: Vec<AnimationSampler>,

    // Runtime state, one entry per channel
    interpolators: Vec<Interpolator>,
    tracks: Vec<Option<Track>>,
}

impl Animation {
    #[must_use]
    pub fn new(name: Option<String>, channels: Vec<AnimationChannel>, samplers: Vec<AnimationSampler>) -> Self {
        let interpolators = vec![Interpolator::new(); channels.len()];
        Self {
            name,
            channels,
            samplers,
            interpolators,
            tracks: Vec::new(),
        }
    }

    /// Decodes every channel's keyframes from the accessor views.
    ///
    /// Channels whose sampler, accessors or layout are unusable are logged and
    /// left inert; the rest of the animation still plays.
    pub fn resolve(
        &mut self,
        accessors: &[Accessor],
        views: &AccessorViews,
        buffer_views: &[BufferView],
        buffers: &[Buffer],
    ) {
        let tracks: Vec<Option<Track>> = self
            .channels
            .iter()
            .enumerate()
            .map(|(i, channel)| {
                let track = self.decode_channel(channel, accessors, views, buffer_views, buffers);
                if track.is_none() {
                    log::warn!(
                        "Animation '{}': channel {i} has no usable keyframes, skipping",
                        self.name.as_deref().unwrap_or("")
                    );
                }
                track
            })
            .collect();

        self.tracks = tracks;
        self.interpolators = vec![Interpolator::new(); self.channels.len()];
    }

    fn decode_channel(
        &self,
        channel: &AnimationChannel,
        accessors: &[Accessor],
        views: &AccessorViews,
        buffer_views: &[BufferView],
        buffers: &[Buffer],
    ) -> Option<Track> {
        let sampler = self.samplers.get(channel.sampler)?;
        channel.target.node?;

        let input_accessor = accessors.get(sampler.input)?;
        let output_accessor = accessors.get(sampler.output)?;
        let input = views.get(sampler.input, ViewKind::Deinterlaced, accessors, buffer_views, buffers)?;
        let output = views.get(sampler.output, ViewKind::Deinterlaced, accessors, buffer_views, buffers)?;

        let times = input.to_f32_vec(input_accessor.normalized);
        let scalars = output.to_f32_vec(output_accessor.normalized);
        if times.is_empty() {
            return None;
        }

        let mode = sampler.interpolation;
        let stride = match channel.target.path.fixed_stride() {
            Some(stride) => stride,
            None => scalars.len() / (times.len() * mode.values_per_key()),
        };
        if stride == 0 {
            return None;
        }

        let track = match channel.target.path {
            TargetPath::Translation => Track::Translation(KeyframeTrack::from_scalars(times, &scalars, stride, mode)),
            TargetPath::Rotation => Track::Rotation(KeyframeTrack::from_scalars(times, &scalars, stride, mode)),
            TargetPath::Scale => Track::Scale(KeyframeTrack::from_scalars(times, &scalars, stride, mode)),
            TargetPath::Weights => Track::Weights(KeyframeTrack::from_scalars(times, &scalars, stride, mode)),
        };
        Some(track)
    }

    /// Evaluates every channel at `t` seconds and writes the results into the nodes.
    ///
    /// TRS results replace the node's transform components; weights replace the
    /// node's morph weights wholesale.
    pub fn advance(&mut self, nodes: &mut [Node], t: f32) {
        for ((channel, track), interpolator) in self.channels.iter().zip(&self.tracks).zip(&mut self.interpolators) {
            let Some(track) = track else { continue };
            let Some(node) = channel.target.node.and_then(|n| nodes.get_mut(n)) else {
                continue;
            };

            match track {
                Track::Translation(track) => {
                    if let Some(v) = interpolator.interpolate(track, t) {
                        node.transform.translation = v;
                    }
                }
                Track::Rotation(track) => {
                    if let Some(q) = interpolator.interpolate(track, t) {
                        node.transform.rotation = q;
                    }
                }
                Track::Scale(track) => {
                    if let Some(v) = interpolator.interpolate(track, t) {
                        node.transform.scale = v;
                    }
                }
                Track::Weights(track) => {
                    if let Some(w) = interpolator.interpolate(track, t) {
                        node.morph_weights = w.0.into_vec();
                    }
                }
            }
        }
    }

    /// Largest key time over all samplers (seconds).
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.tracks
            .iter()
            .flatten()
            .filter_map(|track| track.times().last().copied())
            .fold(0.0, f32::max)
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.tracks.len() == self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::accessor::{ComponentType, ElementType};

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    /// Two keyframes at 0s and 2s moving a node from the origin to (2, 0, 0),
    /// plus two weight keyframes for a two-target mesh.
    fn fixture() -> (Vec<Accessor>, Vec<BufferView>, Vec<Buffer>) {
        let mut data = f32_bytes(&[0.0, 2.0]);
        data.extend(f32_bytes(&[0.0, 0.0, 0.0, 2.0, 0.0, 0.0]));
        data.extend(f32_bytes(&[0.0, 1.0, 1.0, 0.0]));
        let buffers = vec![Buffer::new(data)];
        let views = vec![BufferView::new(0, 0, 8, 0), BufferView::new(0, 8, 24, 0), BufferView::new(0, 32, 16, 0)];
        let accessors = vec![
            Accessor::new(Some(0), 0, ComponentType::F32, ElementType::Scalar, 2),
            Accessor::new(Some(1), 0, ComponentType::F32, ElementType::Vec3, 2),
            Accessor::new(Some(2), 0, ComponentType::F32, ElementType::Scalar, 4),
        ];
        (accessors, views, buffers)
    }

    #[test]
    fn advance_writes_translation_and_weights() {
        let (accessors, views, buffers) = fixture();
        let cache = AccessorViews::new();

        let mut animation = Animation::new(
            Some("move".into()),
            vec![
                AnimationChannel {
                    sampler: 0,
                    target: ChannelTarget {
                        node: Some(0),
                        path: TargetPath::Translation,
                    },
                },
                AnimationChannel {
                    sampler: 1,
                    target: ChannelTarget {
                        node: Some(0),
                        path: TargetPath::Weights,
                    },
                },
            ],
            vec![
                AnimationSampler {
                    input: 0,
                    output: 1,
                    interpolation: InterpolationMode::Linear,
                },
                AnimationSampler {
                    input: 0,
                    output: 2,
                    interpolation: InterpolationMode::Linear,
                },
            ],
        );
        animation.resolve(&accessors, &cache, &views, &buffers);
        assert!(animation.is_resolved());
        assert_eq!(animation.duration(), 2.0);

        let mut nodes = vec![Node::new()];
        animation.advance(&mut nodes, 0.5);

        assert!((nodes[0].transform.translation - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(nodes[0].morph_weights.len(), 2);
        assert!((nodes[0].morph_weights[0] - 0.25).abs() < 1e-5);
        assert!((nodes[0].morph_weights[1] - 0.75).abs() < 1e-5);
    }

    #[test]
    fn channel_without_node_is_inert() {
        let (accessors, views, buffers) = fixture();
        let mut animation = Animation::new(
            None,
            vec![AnimationChannel {
                sampler: 0,
                target: ChannelTarget {
                    node: None,
                    path: TargetPath::Scale,
                },
            }],
            vec![AnimationSampler {
                input: 0,
                output: 1,
                interpolation: InterpolationMode::Step,
            }],
        );
        animation.resolve(&accessors, &AccessorViews::new(), &views, &buffers);

        let mut nodes = vec![Node::new()];
        animation.advance(&mut nodes, 1.0);
        assert_eq!(nodes[0].transform.scale, Vec3::ONE);
        assert_eq!(animation.duration(), 0.0);
    }
}
