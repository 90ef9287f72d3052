//! Artifact path derivation, cache checks and cleanup.

use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use lyrvid_models::TrackIdentity;
use lyrvid_media::fs_utils::remove_if_exists;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// On-disk paths of every artifact a track production touches.
///
/// All paths derive deterministically from the track identity, so repeated
/// requests for the same track resolve to the same files. The final video
/// is the only member with standing lifetime; the rest are intermediates
/// deleted after a successful run.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub lyric_path: std::path::PathBuf,
    pub source_audio_path: std::path::PathBuf,
    pub vocals_path: std::path::PathBuf,
    pub instrumental_path: std::path::PathBuf,
    pub video_path: std::path::PathBuf,
}

impl ArtifactSet {
    /// Derive artifact paths for an identity under the configured roots.
    pub fn resolve(identity: &TrackIdentity, config: &PipelineConfig) -> Self {
        let stem = identity.file_stem();
        Self {
            lyric_path: config.lyrics_dir.join(format!("{stem}.lrc")),
            source_audio_path: config.downloads_dir.join(format!("{stem}.mp3")),
            vocals_path: config.stems_dir.join(format!("{stem}_vocals.wav")),
            instrumental_path: config.stems_dir.join(format!("{stem}_instrumental.wav")),
            video_path: config.videos_dir.join(format!("{stem}.mp4")),
        }
    }

    /// Completeness signal for the cache: the lyric file and the final
    /// video both present. No checksum or staleness validation.
    pub fn is_complete(&self) -> bool {
        self.lyric_path.exists() && self.video_path.exists()
    }

    /// Temp path for the silent (pre-mux) video.
    pub fn silent_video_path(&self) -> std::path::PathBuf {
        self.video_path.with_extension("silent.mp4")
    }

    /// Delete the intermediate artifacts, best effort per file.
    ///
    /// A missing file is not an error (it may already be absent from a
    /// prior partial run); deletion failures are logged and swallowed.
    pub async fn cleanup_intermediates(&self) {
        for path in [
            &self.lyric_path,
            &self.vocals_path,
            &self.instrumental_path,
            &self.source_audio_path,
        ] {
            match remove_if_exists(path).await {
                Ok(true) => debug!("Deleted intermediate: {}", path.display()),
                Ok(false) => {}
                Err(e) => warn!("Failed to delete intermediate {}: {}", path.display(), e),
            }
        }
    }
}

/// Create every configured artifact directory.
pub async fn ensure_directories(config: &PipelineConfig) -> PipelineResult<()> {
    for dir in [
        &config.downloads_dir,
        &config.lyrics_dir,
        &config.stems_dir,
        &config.videos_dir,
    ] {
        fs::create_dir_all(dir).await?;
    }
    Ok(())
}

/// Purge videos older than the retention window.
///
/// Runs eagerly before each request to bound storage growth. Per-file
/// failures are logged and do not abort the purge.
pub async fn purge_stale_videos(dir: &Path, retention: Duration) -> PipelineResult<()> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!("Failed to stat {}: {}", path.display(), e);
                continue;
            }
        };

        let age = metadata
            .modified()
            .ok()
            .and_then(|mtime| mtime.elapsed().ok());
        if matches!(age, Some(age) if age > retention) {
            info!("Deleting old video file: {}", path.display());
            if let Err(e) = fs::remove_file(&path).await {
                warn!("Failed to delete old video {}: {}", path.display(), e);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> PipelineConfig {
        PipelineConfig::with_root(dir.path())
    }

    #[test]
    fn paths_are_deterministic_per_identity() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let identity = TrackIdentity::new("Imagine", "John Lennon");

        let a = ArtifactSet::resolve(&identity, &config);
        let b = ArtifactSet::resolve(&identity, &config);

        assert_eq!(a.video_path, b.video_path);
        assert!(a
            .video_path
            .ends_with("videos/Imagine - John Lennon.mp4"));
        assert!(a.lyric_path.ends_with("lrc/Imagine - John Lennon.lrc"));
        assert!(a
            .instrumental_path
            .ends_with("stems/Imagine - John Lennon_instrumental.wav"));
    }

    #[tokio::test]
    async fn completeness_requires_lyric_and_video() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        ensure_directories(&config).await.unwrap();

        let identity = TrackIdentity::new("Hey Jude", "The Beatles");
        let artifacts = ArtifactSet::resolve(&identity, &config);
        assert!(!artifacts.is_complete());

        fs::write(&artifacts.video_path, b"video").await.unwrap();
        assert!(!artifacts.is_complete());

        fs::write(&artifacts.lyric_path, b"[00:01.00]x").await.unwrap();
        assert!(artifacts.is_complete());
    }

    #[tokio::test]
    async fn cleanup_removes_intermediates_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        ensure_directories(&config).await.unwrap();

        let identity = TrackIdentity::new("Imagine", "John Lennon");
        let artifacts = ArtifactSet::resolve(&identity, &config);

        fs::write(&artifacts.lyric_path, b"x").await.unwrap();
        fs::write(&artifacts.vocals_path, b"x").await.unwrap();
        // instrumental and source intentionally absent
        fs::write(&artifacts.video_path, b"keep").await.unwrap();

        artifacts.cleanup_intermediates().await;

        assert!(!artifacts.lyric_path.exists());
        assert!(!artifacts.vocals_path.exists());
        assert!(artifacts.video_path.exists());
    }

    #[tokio::test]
    async fn purge_skips_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("videos");
        purge_stale_videos(&missing, Duration::from_secs(600))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn purge_keeps_fresh_videos() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("fresh.mp4");
        fs::write(&video, b"v").await.unwrap();

        purge_stale_videos(dir.path(), Duration::from_secs(600))
            .await
            .unwrap();
        assert!(video.exists());

        // With a zero retention window everything qualifies as stale.
        purge_stale_videos(dir.path(), Duration::from_secs(0))
            .await
            .unwrap();
        assert!(!video.exists());
    }
}
