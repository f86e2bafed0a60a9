//! Keyframe animation: sampler decoding, cursor-based interpolation and
//! application of channel results onto scene nodes.

pub mod clip;
pub mod tracks;
pub mod values;

pub use clip::{Animation, AnimationChannel, AnimationSampler, ChannelTarget, TargetPath, Track};
pub use tracks::{InterpolationMode, Interpolator, KeyframeTrack};
pub use values::{Interpolatable, MorphWeights};
