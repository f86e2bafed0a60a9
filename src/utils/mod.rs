//! Utility Module
//!
//! - [`interner`]: String interning for shader feature flags
//! - [`time`]: Animation playback timer
//!
//! ```rust,ignore
//! use lumen::utils::interner;
//!
//! let a = interner::intern("HAS_NORMALS");
//! let b = interner::intern("HAS_NORMALS");
//! assert_eq!(a, b);
//! ```

pub mod interner;
pub mod time;

pub use interner::Symbol;
pub use time::AnimationTimer;
