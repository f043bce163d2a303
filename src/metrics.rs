//! Capture metrics reported through the `metrics` facade.
//!
//! The CLI installs no recorder, so these calls are no-ops unless the crate is
//! embedded in an application that sets one up.

use metrics::{histogram, increment_counter};
use std::time::Duration;

pub const SCREENSHOTS_CAPTURED: &str = "screenshots_captured_total";
pub const SCREENSHOTS_FAILED: &str = "screenshots_failed_total";
pub const CAPTURE_DURATION: &str = "screenshot_capture_seconds";
pub const PRODUCTION_VARIANTS: &str = "production_variants_total";
pub const REQUESTS_BLOCKED: &str = "requests_blocked_total";

pub fn record_capture(device: &str, duration: Duration) {
    increment_counter!(SCREENSHOTS_CAPTURED, "device" => device.to_string());
    histogram!(CAPTURE_DURATION, duration.as_secs_f64());
}

pub fn record_failure(device: &str, kind: &'static str) {
    increment_counter!(SCREENSHOTS_FAILED, "device" => device.to_string(), "kind" => kind);
}

pub fn record_variant(size_key: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    increment_counter!(PRODUCTION_VARIANTS, "size" => size_key.to_string(), "outcome" => outcome);
}

pub fn record_blocked_request() {
    increment_counter!(REQUESTS_BLOCKED);
}
