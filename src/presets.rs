//! Device profiles and production output sizes.
//!
//! Both tables are process-wide constants. Lookups return `None` for unknown
//! keys; callers decide whether that is a hard error or a skipped entry.

use crate::{CaptureError, Result, Size};

const WINDOWS_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const IPAD_SAFARI_UA: &str = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const IPHONE_SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

/// Viewport and user agent emulated for one device preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub viewport: Size,
    pub user_agent: &'static str,
}

pub static DEVICE_PROFILES: &[(&str, DeviceProfile)] = &[
    (
        "desktop",
        DeviceProfile {
            viewport: Size::new(1920, 1080),
            user_agent: WINDOWS_CHROME_UA,
        },
    ),
    (
        "laptop",
        DeviceProfile {
            viewport: Size::new(1366, 768),
            user_agent: WINDOWS_CHROME_UA,
        },
    ),
    (
        "tablet",
        DeviceProfile {
            viewport: Size::new(768, 1024),
            user_agent: IPAD_SAFARI_UA,
        },
    ),
    (
        "mobile",
        DeviceProfile {
            viewport: Size::new(375, 667),
            user_agent: IPHONE_SAFARI_UA,
        },
    ),
    (
        "mobile-large",
        DeviceProfile {
            viewport: Size::new(414, 896),
            user_agent: IPHONE_SAFARI_UA,
        },
    ),
];

pub static PRODUCTION_SIZES: &[(&str, Size)] = &[
    ("thumbnail", Size::new(300, 200)),
    ("card", Size::new(400, 300)),
    ("social-media", Size::new(1200, 630)),
    ("instagram-post", Size::new(1080, 1080)),
    ("instagram-story", Size::new(1080, 1920)),
    ("youtube-thumbnail", Size::new(1280, 720)),
    ("blog-header", Size::new(800, 400)),
    ("email-banner", Size::new(600, 200)),
    ("preview-small", Size::new(200, 150)),
    ("preview-medium", Size::new(400, 300)),
    ("preview-large", Size::new(800, 600)),
];

/// Sizes produced by `--production`.
pub const DEFAULT_PRODUCTION_SIZES: &[&str] = &["thumbnail", "card", "social-media", "blog-header"];

pub fn device_profile(key: &str) -> Option<&'static DeviceProfile> {
    DEVICE_PROFILES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, profile)| profile)
}

pub fn production_size(key: &str) -> Option<Size> {
    PRODUCTION_SIZES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, size)| *size)
}

pub fn device_names() -> Vec<&'static str> {
    DEVICE_PROFILES.iter().map(|(name, _)| *name).collect()
}

pub fn production_size_names() -> Vec<&'static str> {
    PRODUCTION_SIZES.iter().map(|(name, _)| *name).collect()
}

/// Like [`device_profile`], but unknown keys become [`CaptureError::UnknownDevice`].
pub fn resolve_device(key: &str) -> Result<&'static DeviceProfile> {
    device_profile(key).ok_or_else(|| CaptureError::UnknownDevice {
        device: key.to_string(),
        available: device_names().join(", "),
    })
}

/// Like [`production_size`], but unknown keys become [`CaptureError::UnknownSize`].
pub fn resolve_size(key: &str) -> Result<Size> {
    production_size(key).ok_or_else(|| CaptureError::UnknownSize {
        size: key.to_string(),
        available: production_size_names().join(", "),
    })
}
