use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Unknown device preset: {device}. Available: {available}")]
    UnknownDevice { device: String, available: String },

    #[error("Unknown size preset: {size}. Available: {available}")]
    UnknownSize { size: String, available: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Selector '{selector}' did not appear within {timeout:?}")]
    SelectorTimeout { selector: String, timeout: Duration },

    #[error("Screenshot capture failed: {0}")]
    Capture(String),

    #[error("Failed to resize image: {0}")]
    Resize(String),

    #[error("Failed to save screenshot to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CaptureError {
    /// Stage label used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            CaptureError::UnknownDevice { .. } => "unknown_device",
            CaptureError::UnknownSize { .. } => "unknown_size",
            CaptureError::InvalidUrl(_) => "invalid_url",
            CaptureError::BrowserLaunch(_) => "browser_launch",
            CaptureError::Navigation { .. } => "navigation",
            CaptureError::SelectorTimeout { .. } => "selector_timeout",
            CaptureError::Capture(_) => "capture",
            CaptureError::Resize(_) => "resize",
            CaptureError::Persistence { .. } => "persistence",
            CaptureError::Configuration(_) => "configuration",
        }
    }
}

impl From<chromiumoxide::error::CdpError> for CaptureError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        CaptureError::Capture(err.to_string())
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Resize(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
