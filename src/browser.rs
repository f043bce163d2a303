//! Scoped Chrome process for a single capture.
//!
//! A [`BrowserSession`] owns the browser, the task driving its DevTools
//! connection and the throwaway profile directory. `shutdown` closes Chrome
//! before the profile is removed. Dropping the session without calling it
//! still aborts the handler, lets chromiumoxide kill the child process and
//! removes the profile on a best-effort basis.

use crate::{create_browser_config, CaptureError, Config, Result};
use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::Path;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: TempDir,
}

impl BrowserSession {
    pub async fn launch(config: &Config) -> Result<Self> {
        Self::launch_in(config, &std::env::temp_dir()).await
    }

    /// Launch with the throwaway profile created under `parent`.
    ///
    /// The profile is removed again if the launch fails.
    pub async fn launch_in(config: &Config, parent: &Path) -> Result<Self> {
        let profile_dir = tempfile::Builder::new()
            .prefix(&format!("screenshot-capture-{}-", uuid::Uuid::new_v4()))
            .tempdir_in(parent)
            .map_err(|e| {
                CaptureError::BrowserLaunch(format!("Failed to create profile dir: {e}"))
            })?;

        let browser_config = create_browser_config(config, profile_dir.path())?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CaptureError::BrowserLaunch(e.to_string()))?;

        // The handler is a Stream that must be polled for the connection to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
            debug!("Browser handler stream ended");
        });

        info!("Browser launched");
        Ok(Self {
            browser,
            handler,
            profile_dir,
        })
    }

    /// Open a blank page so it can be configured before the first navigation.
    pub async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| CaptureError::Capture(format!("Failed to open page: {e}")))
    }

    /// Close Chrome, then remove its profile directory (on drop).
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        self.handler.abort();
        info!("Browser closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
        debug!("Removing profile {}", self.profile_dir.path().display());
    }
}
