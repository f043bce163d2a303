//! Output filename generation.
//!
//! Names are `screenshot-<domain>-<device>[-<size>]-<YYYY-MM-DD>.<ext>`. Only
//! the calendar date is encoded, so a second run on the same day produces the
//! same name and overwrites the earlier file.

use crate::{CaptureError, OutputFormat, Result};
use chrono::{NaiveDate, Utc};
use url::Url;

/// Filename for a capture taken today (UTC).
pub fn generate_filename(
    url: &str,
    device: &str,
    format: OutputFormat,
    size_tag: Option<&str>,
) -> Result<String> {
    generate_filename_for_date(url, device, format, size_tag, Utc::now().date_naive())
}

pub fn generate_filename_for_date(
    url: &str,
    device: &str,
    format: OutputFormat,
    size_tag: Option<&str>,
    date: NaiveDate,
) -> Result<String> {
    let domain = domain_token(url)?;
    let size = size_tag.map(|tag| format!("-{tag}")).unwrap_or_default();

    Ok(format!(
        "screenshot-{domain}-{device}{size}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    ))
}

/// Hostname of `url` with every `.` replaced by `-`.
pub fn domain_token(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| CaptureError::InvalidUrl(format!("{url}: {e}")))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| CaptureError::InvalidUrl(format!("{url}: missing host")))?;

    Ok(host.replace('.', "-"))
}
