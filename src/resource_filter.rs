//! Request filtering during page load.
//!
//! Media, websockets, video files served as images and analytics/tracking
//! requests are failed with `BlockedByClient` so navigation never waits on
//! them. Everything else is continued untouched.

use crate::{Config, Result};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::Page;
use futures::StreamExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Allow,
    Block,
}

pub struct ResourceFilter {
    /// Substrings that mark an image request as actually being a video file
    video_markers: Vec<String>,
    /// Substrings that block a request whatever its resource type
    blocked_markers: Vec<String>,
}

impl ResourceFilter {
    pub fn new() -> Self {
        Self {
            video_markers: vec![".mp4".to_string(), ".webm".to_string()],
            blocked_markers: vec!["analytics".to_string(), "tracking".to_string()],
        }
    }

    /// Default rules plus the configured `blocked_url_markers`.
    pub fn from_config(config: &Config) -> Self {
        let mut filter = Self::new();
        filter
            .blocked_markers
            .extend(config.blocked_url_markers.iter().cloned());
        filter
    }

    pub fn decide(&self, resource_type: &ResourceType, url: &str) -> FilterDecision {
        let blocked = match resource_type {
            ResourceType::Media | ResourceType::WebSocket => true,
            ResourceType::Image if self.video_markers.iter().any(|m| url.contains(m.as_str())) => true,
            _ => self.blocked_markers.iter().any(|m| url.contains(m.as_str())),
        };

        if blocked {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }

    /// [`decide`](Self::decide), falling back to `Allow` if evaluation panics.
    pub fn decide_or_allow(&self, resource_type: &ResourceType, url: &str) -> FilterDecision {
        fail_open(|| self.decide(resource_type, url))
    }

    /// Enable `Fetch` interception on `page` and answer every paused request
    /// from a background task. Interception stops when the guard is dropped.
    pub async fn install(self: Arc<Self>, page: &Page) -> Result<FilterGuard> {
        let mut paused = page.event_listener::<EventRequestPaused>().await?;

        let enable = EnableParams::builder()
            .pattern(RequestPattern::builder().url_pattern("*").build())
            .build();
        page.execute(enable).await?;

        let page = page.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                self.answer(&page, &event).await;
            }
        });

        Ok(FilterGuard { task })
    }

    async fn answer(&self, page: &Page, event: &EventRequestPaused) {
        let url = &event.request.url;

        if self.decide_or_allow(&event.resource_type, url) == FilterDecision::Block {
            debug!("Blocking {:?} request: {}", event.resource_type, url);
            crate::metrics::record_blocked_request();

            let fail = FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
            match page.execute(fail).await {
                Ok(_) => return,
                Err(e) => warn!("Failed to block {}, letting it through: {}", url, e),
            }
        }

        if let Err(e) = page.execute(ContinueRequestParams::new(event.request_id.clone())).await {
            debug!("Failed to continue request {}: {}", url, e);
        }
    }
}

fn fail_open(decide: impl FnOnce() -> FilterDecision) -> FilterDecision {
    panic::catch_unwind(AssertUnwindSafe(decide)).unwrap_or_else(|_| {
        warn!("Request filter panicked, allowing request");
        FilterDecision::Allow
    })
}

impl Default for ResourceFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the interception task alive; aborts it on drop.
pub struct FilterGuard {
    task: JoinHandle<()>,
}

impl Drop for FilterGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
