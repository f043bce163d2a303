use crate::{CaptureError, Result};
use std::path::Path;
use tokio::fs;

/// Write `data` to `path`, creating missing parent directories and replacing
/// any existing file.
pub async fn save_screenshot(data: &[u8], path: &Path) -> Result<()> {
    let persistence = |source: std::io::Error| CaptureError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(persistence)?;
    }

    fs::write(path, data).await.map_err(persistence)?;
    Ok(())
}
