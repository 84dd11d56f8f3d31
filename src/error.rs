use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, resolving or rendering a chart
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON text
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A single entry did not match its shape
    #[error("{section}[{index}]: {source}")]
    Entry {
        section: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Tagged-list entry without a `type` field
    #[error("entries[{index}]: missing \"type\" field")]
    MissingType { index: usize },

    /// Top-level value is neither an object nor an array
    #[error("expected a JSON object or array at the top level, found {0}")]
    InvalidDocument(&'static str),

    #[error("{what}: x has {x} values but y has {y}")]
    LengthMismatch { what: String, x: usize, y: usize },

    #[error("{0}: coordinates must be finite")]
    NonFinite(String),

    #[error("{what}: radius must not be negative (got {radius})")]
    NegativeRadius { what: String, radius: f64 },

    #[error("invalid color spec {0:?}")]
    InvalidColor(String),

    #[error("invalid figure size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("cannot save {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("window error: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    Adapter,

    #[error("device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, PlotError>;
