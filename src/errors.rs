//! Error Types
//!
//! This module defines the error types used throughout the viewer core.
//!
//! # Overview
//!
//! The main error type [`LumenError`] covers the failure modes that have to be
//! reported to a caller:
//! - Asset loading errors (missing files, malformed glTF, no scenes)
//! - Shader template rendering, parsing and compilation errors
//! - GPU device creation errors
//!
//! Recoverable per-frame conditions (a missing buffer view, an unbound image, an
//! unknown uniform) are *not* errors: they are logged and the affected primitive
//! is skipped for that frame.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen::errors::{LumenError, Result};
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the viewer core.
#[derive(Error, Debug)]
pub enum LumenError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// A shader variant failed to compile.
    #[error("Shader compilation failed for '{label}': {message}")]
    ShaderCompile {
        /// Template name of the failing variant
        label: String,
        /// Compiler diagnostic
        message: String,
    },

    /// Two compiled shader units could not be linked into a program.
    #[error("Program link failed: {0}")]
    ProgramLink(String),

    /// A GPU handle was used after it was destroyed (or never existed).
    #[error("Invalid GPU handle: {0}")]
    InvalidHandle(&'static str),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The loaded asset contains no scenes, so there is nothing to render.
    #[error("glTF asset contains no scenes")]
    NoScenes,

    /// Asset index out of bounds.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    /// The asset requires an extension this loader cannot honour.
    #[error("Unsupported required extension: {0}")]
    UnsupportedExtension(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(#[from] gltf::Error),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    // ========================================================================
    // Shader Template Errors
    // ========================================================================
    /// Template rendering error (minijinja).
    #[error("Shader template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// WGSL front-end error while reflecting a program.
    #[error("WGSL parse error: {0}")]
    WgslParseError(String),
}

impl From<naga::front::wgsl::ParseError> for LumenError {
    fn from(err: naga::front::wgsl::ParseError) -> Self {
        LumenError::WgslParseError(err.to_string())
    }
}

/// Alias for `Result<T, LumenError>`.
pub type Result<T> = std::result::Result<T, LumenError>;
