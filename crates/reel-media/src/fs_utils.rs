//! Filesystem helpers shared by download, transcode and cleanup.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::error::MediaResult;

/// Create the parent directory of `path` if it does not exist.
pub async fn ensure_parent_dir(path: impl AsRef<Path>) -> MediaResult<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Remove a file. A missing file is not an error.
///
/// Returns `true` if a file was actually removed.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Best-effort removal of a partial output left behind by a failed step.
pub(crate) async fn discard_partial(path: &Path) {
    match remove_if_exists(path).await {
        Ok(true) => tracing::debug!("Discarded partial output {}", path.display()),
        Ok(false) => {}
        Err(e) => tracing::warn!("Failed to discard partial output {}: {}", path.display(), e),
    }
}
