//! Main screenshot service orchestrating the capture pipeline
//!
//! [`ScreenshotService`] resolves the device profile, asks a [`PageRenderer`]
//! for the raw pixels, then optionally resizes and persists them. The
//! production renderer, [`ChromeRenderer`], drives one short-lived Chrome
//! process per capture.

use crate::navigation::{navigate, wait_for_selector};
use crate::{
    resize_image, resolve_device, save_screenshot, BrowserSession, CaptureOptions, Clip, Config,
    DeviceProfile, OutputFormat, ResourceFilter, Result,
};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, Viewport};
use chromiumoxide::page::{Page, ScreenshotParams};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Renders a URL under a device profile and returns the encoded screenshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(
        &self,
        url: &str,
        profile: &DeviceProfile,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>>;
}

/// Screenshot service for single captures and production batches
///
/// # Examples
///
/// ```rust,no_run
/// use screenshot_capture::{CaptureOptions, Config, ScreenshotService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = ScreenshotService::new(Config::default())?;
///
///     let png = service
///         .capture("https://example.com", "desktop", &CaptureOptions::default())
///         .await?;
///     println!("Captured {} bytes", png.len());
///
///     Ok(())
/// }
/// ```
pub struct ScreenshotService {
    renderer: Arc<dyn PageRenderer>,
}

impl ScreenshotService {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_renderer(Arc::new(ChromeRenderer::new(config))))
    }

    pub fn with_renderer(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// Capture `url` as seen by `device`.
    ///
    /// Unknown devices are rejected before any browser is started.
    pub async fn capture(&self, url: &str, device: &str, options: &CaptureOptions) -> Result<Vec<u8>> {
        let profile = resolve_device(device)?;
        let start = Instant::now();

        match self.capture_with_profile(url, profile, options).await {
            Ok(data) => {
                crate::metrics::record_capture(device, start.elapsed());
                Ok(data)
            }
            Err(e) => {
                crate::metrics::record_failure(device, e.kind());
                Err(e)
            }
        }
    }

    async fn capture_with_profile(
        &self,
        url: &str,
        profile: &DeviceProfile,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>> {
        let mut data = self.renderer.render(url, profile, options).await?;

        if let Some(size) = options.fixed_size {
            debug!("Resizing capture to {}", size);
            data = resize_image(&data, size, options.format, options.quality)?;
        }

        if let Some(path) = &options.output_path {
            save_screenshot(&data, path).await?;
            info!("Screenshot saved to: {}", path.display());
        }

        Ok(data)
    }
}

/// [`PageRenderer`] backed by a freshly launched Chrome per call.
pub struct ChromeRenderer {
    config: Config,
    filter: Arc<ResourceFilter>,
}

impl ChromeRenderer {
    pub fn new(config: Config) -> Self {
        Self {
            filter: Arc::new(ResourceFilter::from_config(&config)),
            config,
        }
    }

    async fn render_on_page(
        &self,
        page: &Page,
        url: &str,
        profile: &DeviceProfile,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>> {
        let device_metrics = SetDeviceMetricsOverrideParams::builder()
            .width(profile.viewport.width)
            .height(profile.viewport.height)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(crate::CaptureError::Capture)?;
        page.execute(device_metrics).await?;
        page.execute(SetUserAgentOverrideParams::new(profile.user_agent)).await?;

        // Held until the capture finishes; dropping it stops interception.
        let _filter = if options.block_resources {
            Some(self.filter.clone().install(page).await?)
        } else {
            None
        };

        info!("Navigating to {}", url);
        navigate(page, url, self.config.navigation_timeout, self.config.network_idle).await?;

        if let Some(selector) = &options.wait_for_selector {
            debug!("Waiting for selector {}", selector);
            wait_for_selector(page, selector, self.config.selector_timeout).await?;
        }

        if !options.delay.is_zero() {
            sleep(options.delay).await;
        }

        let data = page.screenshot(screenshot_params(options)).await?;
        debug!("Captured {} bytes", data.len());
        Ok(data)
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(
        &self,
        url: &str,
        profile: &DeviceProfile,
        options: &CaptureOptions,
    ) -> Result<Vec<u8>> {
        let session = BrowserSession::launch(&self.config).await?;

        let outcome = match session.new_page().await {
            Ok(page) => {
                let outcome = self.render_on_page(&page, url, profile, options).await;
                if let Err(e) = page.close().await {
                    warn!("Failed to close page: {}", e);
                }
                outcome
            }
            Err(e) => Err(e),
        };

        session.shutdown().await;
        outcome
    }
}

/// Translate capture options into DevTools screenshot parameters.
///
/// A clip region always wins over `full_page`.
pub fn screenshot_params(options: &CaptureOptions) -> ScreenshotParams {
    let mut builder = ScreenshotParams::builder()
        .format(match options.format {
            OutputFormat::Png => CaptureScreenshotFormat::Png,
            OutputFormat::Jpeg => CaptureScreenshotFormat::Jpeg,
        })
        .full_page(options.full_page && options.clip.is_none());

    if options.format == OutputFormat::Jpeg {
        builder = builder.quality(i64::from(options.quality.min(100)));
    }

    if let Some(clip) = options.clip {
        builder = builder.clip(clip_viewport(clip));
    }

    builder.build()
}

fn clip_viewport(clip: Clip) -> Viewport {
    Viewport {
        x: clip.x,
        y: clip.y,
        width: clip.width,
        height: clip.height,
        scale: 1.0,
    }
}
