//! Configuration management with serde serialization/deserialization
//!
//! This module provides the browser/launch configuration for the capture tool
//! together with the per-invocation capture options and the small value types
//! (sizes, clip regions, output formats) they are built from.

use crate::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the capture tool
///
/// Controls how Chrome is launched and how long each page-load stage may take.
/// Usually loaded from a JSON file (`--config`) and then overridden by CLI flags.
///
/// # Examples
///
/// ```rust
/// use screenshot_capture::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     navigation_timeout: Duration::from_secs(60),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Run Chrome without a visible window (default: true)
    pub headless: bool,

    /// Upper bound for navigation plus network quiescence (default: 30 seconds)
    pub navigation_timeout: Duration,

    /// Upper bound for `wait_for_selector` (default: 10 seconds)
    pub selector_timeout: Duration,

    /// How long the network must stay free of in-flight requests before the
    /// page counts as loaded (default: 500ms)
    pub network_idle: Duration,

    /// Timeout for individual DevTools protocol commands (default: 30 seconds)
    pub request_timeout: Duration,

    /// Extra Chrome command-line arguments appended after the built-in set
    pub extra_args: Vec<String>,

    /// URL substrings blocked in addition to analytics and tracking
    pub blocked_url_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            navigation_timeout: Duration::from_secs(30),
            selector_timeout: Duration::from_secs(10),
            network_idle: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
            extra_args: Vec::new(),
            blocked_url_markers: Vec::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.navigation_timeout.is_zero() {
            return Err(CaptureError::Configuration(
                "Navigation timeout must be greater than 0".to_string(),
            ));
        }

        if self.selector_timeout.is_zero() {
            return Err(CaptureError::Configuration(
                "Selector timeout must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(CaptureError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Pixel dimensions of a viewport or an output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Rectangular region of the page to capture, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Clip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Supported output image formats for screenshots
///
/// - PNG: Lossless compression, larger files, best quality
/// - JPEG: Lossy compression, smaller files, honours `quality`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything one capture needs besides the URL and device.
///
/// Built once per invocation and never mutated afterwards; the production
/// batch derives its base-capture options from a copy.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Where to persist the final bytes; `None` only returns them
    pub output_path: Option<PathBuf>,
    pub format: OutputFormat,
    /// JPEG quality 0-100, ignored for PNG
    pub quality: u8,
    pub full_page: bool,
    /// Capture only this region; takes precedence over `full_page`
    pub clip: Option<Clip>,
    pub wait_for_selector: Option<String>,
    /// Fixed settle time after load (and after the selector wait)
    pub delay: Duration,
    pub block_resources: bool,
    /// Resize the captured image to exactly this size
    pub fixed_size: Option<Size>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            output_path: None,
            format: OutputFormat::Png,
            quality: 90,
            full_page: true,
            clip: None,
            wait_for_selector: None,
            delay: Duration::ZERO,
            block_resources: true,
            fixed_size: None,
        }
    }
}

/// Generate Chrome command-line arguments based on configuration
///
/// # Examples
///
/// ```rust
/// use screenshot_capture::{Config, get_chrome_args};
///
/// let args = get_chrome_args(&Config::default());
/// assert!(args.contains(&"--no-sandbox".to_string()));
/// ```
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-web-security".to_string(),
        "--disable-features=VizDisplayCompositor".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--hide-scrollbars".to_string(),
        "--mute-audio".to_string(),
    ];

    args.extend(config.extra_args.iter().cloned());
    args
}

/// Build the chromiumoxide launch configuration for one browser session.
///
/// `profile_dir` becomes Chrome's user data directory so concurrent runs of
/// the tool never share a profile.
pub fn create_browser_config(
    config: &Config,
    profile_dir: &Path,
) -> Result<chromiumoxide::browser::BrowserConfig> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .args(get_chrome_args(config))
        .user_data_dir(profile_dir)
        .request_timeout(config.request_timeout);

    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(CaptureError::BrowserLaunch)
}
