//! Rendering Options
//!
//! Per-frame parameters of the viewer: lighting toggles, tone mapping, debug
//! channels and which scene, camera and animations are active.
//!
//! All types are `serde` (de)serializable so a host can persist or transmit
//! them as JSON. Camera and animation selectors accept the `"user"` and
//! `"all"` sentinels next to plain indices.
//!
//! ```rust,ignore
//! use lumen::renderer::settings::{RenderingOptions, ToneMap};
//!
//! let options: RenderingOptions = serde_json::from_str(
//!     r#"{ "tone_map": "aces", "camera": 0, "animation": "all" }"#,
//! )?;
//! assert_eq!(options.tone_map, ToneMap::Aces);
//! ```

use serde::{Deserialize, Serialize};

use crate::resources::shader_defines::ShaderDefines;

// ---------------------------------------------------------------------------
// ToneMap
// ---------------------------------------------------------------------------

/// Tone mapping operator applied after exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMap {
    /// Plain gamma encoding.
    #[default]
    Linear,
    Uncharted,
    HejlRichard,
    Aces,
}

impl ToneMap {
    /// Feature flag selecting the operator; `None` for the linear path.
    #[must_use]
    pub const fn define(self) -> Option<&'static str> {
        match self {
            Self::Linear => None,
            Self::Uncharted => Some("TONEMAP_UNCHARTED"),
            Self::HejlRichard => Some("TONEMAP_HEJLRICHARD"),
            Self::Aces => Some("TONEMAP_ACES"),
        }
    }
}

// ---------------------------------------------------------------------------
// DebugOutput
// ---------------------------------------------------------------------------

/// Intermediate shading channel written to the framebuffer instead of the lit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugOutput {
    #[default]
    None,
    Metallic,
    Roughness,
    Normal,
    Tangent,
    Bitangent,
    BaseColor,
    Occlusion,
    Emissive,
    Alpha,
}

impl DebugOutput {
    #[must_use]
    pub const fn define(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Metallic => Some("DEBUG_METALLIC"),
            Self::Roughness => Some("DEBUG_ROUGHNESS"),
            Self::Normal => Some("DEBUG_NORMAL"),
            Self::Tangent => Some("DEBUG_TANGENT"),
            Self::Bitangent => Some("DEBUG_BITANGENT"),
            Self::BaseColor => Some("DEBUG_BASECOLOR"),
            Self::Occlusion => Some("DEBUG_OCCLUSION"),
            Self::Emissive => Some("DEBUG_EMISSIVE"),
            Self::Alpha => Some("DEBUG_ALPHA"),
        }
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Serialized form shared by the selectors: an index or a sentinel name.
#[doc(hidden)]
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorRepr {
    Index(usize),
    Name(String),
}

/// Which camera drives the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SelectorRepr", into = "SelectorRepr")]
pub enum CameraSelector {
    /// An authored camera of the asset.
    Index(usize),
    /// The interactive orbit camera (`"user"`).
    #[default]
    User,
}

impl TryFrom<SelectorRepr> for CameraSelector {
    type Error = String;

    fn try_from(repr: SelectorRepr) -> Result<Self, Self::Error> {
        match repr {
            SelectorRepr::Index(i) => Ok(Self::Index(i)),
            SelectorRepr::Name(name) if name == "user" => Ok(Self::User),
            SelectorRepr::Name(name) => Err(format!("unknown camera selector '{name}'")),
        }
    }
}

impl From<CameraSelector> for SelectorRepr {
    fn from(selector: CameraSelector) -> Self {
        match selector {
            CameraSelector::Index(i) => Self::Index(i),
            CameraSelector::User => Self::Name("user".to_string()),
        }
    }
}

/// Which animations advance with the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SelectorRepr", into = "SelectorRepr")]
pub enum AnimationSelector {
    Index(usize),
    /// Every animation of the asset (`"all"`).
    #[default]
    All,
}

impl TryFrom<SelectorRepr> for AnimationSelector {
    type Error = String;

    fn try_from(repr: SelectorRepr) -> Result<Self, Self::Error> {
        match repr {
            SelectorRepr::Index(i) => Ok(Self::Index(i)),
            SelectorRepr::Name(name) if name == "all" => Ok(Self::All),
            SelectorRepr::Name(name) => Err(format!("unknown animation selector '{name}'")),
        }
    }
}

impl From<AnimationSelector> for SelectorRepr {
    fn from(selector: AnimationSelector) -> Self {
        match selector {
            AnimationSelector::Index(i) => Self::Index(i),
            AnimationSelector::All => Self::Name("all".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderingOptions
// ---------------------------------------------------------------------------

/// Parameters read by [`SceneRenderer`](crate::renderer::SceneRenderer) every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingOptions {
    /// Image based lighting; only honoured once an environment is set.
    pub use_ibl: bool,
    /// `KHR_lights_punctual` lights (or the default light when none are visible).
    pub use_punctual: bool,
    pub exposure: f32,
    pub tone_map: ToneMap,
    pub debug_output: DebugOutput,
    pub skinning: bool,
    pub morphing: bool,
    pub scene_index: usize,
    pub camera: CameraSelector,
    pub animation: AnimationSelector,
    /// sRGB bytes.
    pub clear_color: [u8; 3],
}

impl Default for RenderingOptions {
    fn default() -> Self {
        Self {
            use_ibl: true,
            use_punctual: false,
            exposure: 1.0,
            tone_map: ToneMap::Linear,
            debug_output: DebugOutput::None,
            skinning: true,
            morphing: true,
            scene_index: 0,
            camera: CameraSelector::User,
            animation: AnimationSelector::All,
            clear_color: [50, 50, 50],
        }
    }
}

impl RenderingOptions {
    #[must_use]
    pub fn user_camera_active(&self) -> bool {
        self.camera == CameraSelector::User
    }

    /// Clear color as normalized RGBA.
    #[must_use]
    pub fn clear_color_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.clear_color;
        [f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0, 1.0]
    }

    /// Appends the fragment flags these options select.
    ///
    /// `light_count` is the number of visible lights; `has_environment` tells
    /// whether IBL textures were supplied.
    pub fn push_fragment_defines(&self, defines: &mut ShaderDefines, light_count: usize, has_environment: bool) {
        if self.use_punctual {
            defines.enable("USE_PUNCTUAL");
            defines.set("LIGHT_COUNT", &light_count.to_string());
        }

        if self.use_ibl && has_environment {
            defines.enable("USE_IBL");
        }

        if let Some(flag) = self.tone_map.define() {
            defines.enable(flag);
        }

        if let Some(flag) = self.debug_output.define() {
            defines.enable("DEBUG_OUTPUT");
            defines.enable(flag);
        }
    }
}
