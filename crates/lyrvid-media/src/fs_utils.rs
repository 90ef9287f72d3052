//! Filesystem helpers shared by the media wrappers.

use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, handling cross-device moves.
///
/// Demucs writes stems into a temp directory that may live on a different
/// filesystem than the stem targets, so a plain rename can fail with EXDEV.
/// In that case fall back to copy-and-delete, staging the copy next to the
/// destination so the final rename is atomic.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                "Cross-device rename, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is error code 18 on Linux/macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = dst.with_extension("tmp");

    fs::copy(src, &tmp_dst).await?;
    fs::rename(&tmp_dst, dst).await.map_err(|e| {
        let _ = std::fs::remove_file(&tmp_dst);
        MediaError::from(e)
    })?;

    if let Err(e) = fs::remove_file(src).await {
        warn!("Failed to remove source after cross-device move: {}: {}", src.display(), e);
    }

    Ok(())
}

/// Remove a file, treating "already gone" as success.
///
/// Returns true when a file was actually deleted.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MediaError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn move_file_renames_within_filesystem() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.wav");
        let dst = dir.path().join("stems").join("dst.wav");

        fs::write(&src, b"pcm").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert!(dst.exists());
    }

    #[tokio::test]
    async fn remove_if_exists_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");

        assert!(!remove_if_exists(&path).await.unwrap());

        fs::write(&path, b"x").await.unwrap();
        assert!(remove_if_exists(&path).await.unwrap());
        assert!(!path.exists());
    }
}
