//! # Screenshot Capture
//!
//! Website screenshots through headless Chrome, with device emulation and
//! preset output sizes for thumbnails, social cards and banners.
//!
//! One invocation launches one browser, renders one page and writes one or
//! more image files. Production mode renders the page once and derives every
//! requested size from that single full-page capture.
//!
//! ## Device presets
//!
//! | Device | Viewport |
//! |--------|----------|
//! | desktop | 1920x1080 |
//! | laptop | 1366x768 |
//! | tablet | 768x1024 |
//! | mobile | 375x667 |
//! | mobile-large | 414x896 |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use screenshot_capture::{CaptureOptions, Config, ProductionOptions, ScreenshotService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ScreenshotService::new(Config::default())?;
//!
//!     let png = service
//!         .capture("https://example.com", "desktop", &CaptureOptions::default())
//!         .await?;
//!     println!("Screenshot captured: {} bytes", png.len());
//!
//!     let results = service
//!         .capture_production(
//!             "https://example.com",
//!             "desktop",
//!             &["thumbnail", "social-media"],
//!             &ProductionOptions::new("screenshots"),
//!         )
//!         .await?;
//!     println!("Wrote {} files", results.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! screenshot-capture https://example.com desktop
//! screenshot-capture https://example.com mobile --size=thumbnail
//! screenshot-capture https://example.com desktop --production --output=out/
//! ```

/// Configuration, capture options and value types
pub mod config;

/// Error types
pub mod error;

/// Device profiles and production output sizes
pub mod presets;

/// Output filename generation
pub mod filename;

/// Request blocking during page load
pub mod resource_filter;

/// Scoped browser process
pub mod browser;

/// Navigation and wait conditions
pub mod navigation;

/// Cover-fit image resizing
pub mod resize;

/// Writing screenshots to disk
pub mod storage;

/// Capture pipeline
pub mod screenshot_service;

/// Production batch captures
pub mod production;

/// Command-line interface implementation
pub mod cli;

/// Capture metrics
pub mod metrics;

/// Formatting helpers
pub mod utils;


pub use browser::*;
pub use cli::*;
pub use config::*;
pub use error::*;
pub use filename::*;
pub use presets::*;
pub use production::*;
pub use resize::*;
pub use resource_filter::*;
pub use screenshot_service::*;
pub use storage::*;
pub use utils::*;
