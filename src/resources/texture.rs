//! Textures, samplers and host-decoded images.
//!
//! Pixel decoding is the host's job: the loader records where each image's
//! encoded bytes live ([`ImageSource`]) and the host hands back an [`Image`]
//! with RGBA8 pixels. A texture whose image was never resolved is not
//! renderable.

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    /// Creates an image, returning `None` when `data` is not `width × height × 4` bytes.
    #[must_use]
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self { width, height, data })
    }
}

/// Where the encoded bytes of an image live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Uri { uri: String, mime_type: Option<String> },
    BufferView { buffer_view: usize, mime_type: String },
    /// Neither a usable `uri` nor a `bufferView`; the image never decodes.
    Missing,
}

/// An image slot of the asset: its encoded source plus the decoded pixels once
/// the host supplied them.
#[derive(Debug, Clone)]
pub struct ImageSlot {
    pub name: Option<String>,
    pub source: ImageSource,
    pub decoded: Option<Image>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl WrapMode {
    #[must_use]
    pub const fn from_gl(code: u32) -> Self {
        match code {
            33071 => Self::ClampToEdge,
            33648 => Self::MirroredRepeat,
            _ => Self::Repeat,
        }
    }
}

/// Sampler state (glTF sampler with GL filter codes already decoded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sampler {
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    /// `Some` when the min filter samples mip levels.
    pub mipmap_filter: Option<FilterMode>,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

impl Sampler {
    /// Builds a sampler from glTF `magFilter`/`minFilter`/`wrapS`/`wrapT` codes.
    #[must_use]
    pub fn from_gl(mag: Option<u32>, min: Option<u32>, wrap_s: u32, wrap_t: u32) -> Self {
        let mag_filter = match mag {
            Some(9728) => FilterMode::Nearest,
            _ => FilterMode::Linear,
        };
        let (min_filter, mipmap_filter) = match min {
            Some(9728) => (FilterMode::Nearest, None),
            Some(9729) => (FilterMode::Linear, None),
            Some(9984) => (FilterMode::Nearest, Some(FilterMode::Nearest)),
            Some(9985) => (FilterMode::Linear, Some(FilterMode::Nearest)),
            Some(9986) => (FilterMode::Nearest, Some(FilterMode::Linear)),
            _ => (FilterMode::Linear, Some(FilterMode::Linear)),
        };
        Self {
            mag_filter,
            min_filter,
            mipmap_filter,
            wrap_s: WrapMode::from_gl(wrap_s),
            wrap_t: WrapMode::from_gl(wrap_t),
        }
    }
}

/// A glTF texture: an image paired with an optional sampler.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub name: Option<String>,
    pub source: Option<usize>,
    pub sampler: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_from_gl_codes() {
        let sampler = Sampler::from_gl(Some(9728), Some(9987), 33071, 33648);
        assert_eq!(sampler.mag_filter, FilterMode::Nearest);
        assert_eq!(sampler.min_filter, FilterMode::Linear);
        assert_eq!(sampler.mipmap_filter, Some(FilterMode::Linear));
        assert_eq!(sampler.wrap_s, WrapMode::ClampToEdge);
        assert_eq!(sampler.wrap_t, WrapMode::MirroredRepeat);
    }

    #[test]
    fn image_size_is_validated() {
        assert!(Image::new_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(Image::new_rgba8(2, 2, vec![0; 12]).is_none());
    }
}
