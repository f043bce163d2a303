//! Production batch: one full-page render, many resized variants.

use crate::{
    format_kilobytes, generate_filename, production_size, resize_image, save_screenshot,
    CaptureOptions, Result, ScreenshotService, Size,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ProductionOptions {
    pub output_dir: PathBuf,
    /// Options for the base capture; format and quality also apply to every variant
    pub capture: CaptureOptions,
}

impl ProductionOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            capture: CaptureOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductionResult {
    pub size_key: String,
    pub size: Size,
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl ProductionResult {
    pub fn file_size(&self) -> String {
        format_kilobytes(self.data.len())
    }
}

impl ScreenshotService {
    /// Render `url` once as a full page and derive one file per size key.
    ///
    /// A failed base capture is returned as an error. Unknown keys and
    /// variants that fail to resize or save are logged and left out, so the
    /// result may hold fewer entries than requested.
    pub async fn capture_production(
        &self,
        url: &str,
        device: &str,
        size_keys: &[&str],
        options: &ProductionOptions,
    ) -> Result<Vec<ProductionResult>> {
        info!("Capturing production screenshots for: {}", url);
        info!("Sizes: {}", size_keys.join(", "));

        let base_options = CaptureOptions {
            output_path: None,
            full_page: true,
            clip: None,
            fixed_size: None,
            ..options.capture.clone()
        };
        let base = self.capture(url, device, &base_options).await?;

        let mut results = Vec::with_capacity(size_keys.len());
        for &size_key in size_keys {
            let Some(size) = production_size(size_key) else {
                warn!("Unknown size preset: {}, skipping...", size_key);
                continue;
            };

            let variant = derive_variant(
                &base,
                url,
                device,
                size_key,
                size,
                &options.output_dir,
                &options.capture,
            )
            .await;

            match variant {
                Ok(result) => {
                    debug!("Wrote {} ({}) to {}", size_key, size, result.path.display());
                    crate::metrics::record_variant(size_key, true);
                    results.push(result);
                }
                Err(e) => {
                    error!("✗ Failed to create {}: {}", size_key, e);
                    crate::metrics::record_variant(size_key, false);
                }
            }
        }

        Ok(results)
    }
}

async fn derive_variant(
    base: &[u8],
    url: &str,
    device: &str,
    size_key: &str,
    size: Size,
    output_dir: &Path,
    capture: &CaptureOptions,
) -> Result<ProductionResult> {
    let data = resize_image(base, size, capture.format, capture.quality)?;
    let path = output_dir.join(generate_filename(url, device, capture.format, Some(size_key))?);

    save_screenshot(&data, &path).await?;

    Ok(ProductionResult {
        size_key: size_key.to_string(),
        size,
        path,
        data,
    })
}
