//! Pipeline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one pipeline instance.
///
/// All state the original steps read from globals lives here: artifact
/// directories, the video retention window, the stem-wait bound and the
/// credential material for the external lookups.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Source audio downloads.
    pub downloads_dir: PathBuf,
    /// Persisted lyric files.
    pub lyrics_dir: PathBuf,
    /// Separated stems.
    pub stems_dir: PathBuf,
    /// Final videos.
    pub videos_dir: PathBuf,
    /// Usage ledger file.
    pub ledger_path: PathBuf,
    /// Videos older than this are purged before each request.
    pub video_retention: Duration,
    /// Maximum time the rendering job waits for the instrumental stem.
    /// `None` preserves the unbounded wait.
    pub stem_wait_timeout: Option<Duration>,
    /// Search result bound passed to the audio search.
    pub search_limit: usize,
    /// On-screen duration of the final lyric line.
    pub trailing_segment_seconds: f64,
    /// Optional Netscape cookies file for the audio download.
    pub cookies_path: Option<PathBuf>,
    /// Spotify client credentials.
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_root(".")
    }
}

impl PipelineConfig {
    /// Config with every artifact directory under `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            downloads_dir: root.join("downloads"),
            lyrics_dir: root.join("lrc"),
            stems_dir: root.join("stems"),
            videos_dir: root.join("videos"),
            ledger_path: root.join("usage.tsv"),
            video_retention: Duration::from_secs(10 * 60),
            stem_wait_timeout: None,
            search_limit: 10,
            trailing_segment_seconds: 5.0,
            cookies_path: None,
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let root = std::env::var("LYRVID_DATA_DIR").unwrap_or_else(|_| ".".to_string());
        let mut config = Self::with_root(root);

        if let Some(minutes) = env_parse::<u64>("VIDEO_RETENTION_MINUTES") {
            config.video_retention = Duration::from_secs(minutes * 60);
        }
        if let Some(secs) = env_parse::<u64>("STEM_WAIT_TIMEOUT_SECONDS") {
            config.stem_wait_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(limit) = env_parse::<usize>("SEARCH_LIMIT") {
            config.search_limit = limit;
        }
        if let Ok(path) = std::env::var("YTDLP_COOKIES_FILE") {
            config.cookies_path = Some(PathBuf::from(path));
        }
        config.spotify_client_id = std::env::var("SPOTIFY_CLIENT_ID").unwrap_or_default();
        config.spotify_client_secret = std::env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default();

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_root_derives_directories() {
        let config = PipelineConfig::with_root("/data");
        assert_eq!(config.downloads_dir, Path::new("/data/downloads"));
        assert_eq!(config.lyrics_dir, Path::new("/data/lrc"));
        assert_eq!(config.videos_dir, Path::new("/data/videos"));
        assert_eq!(config.video_retention, Duration::from_secs(600));
        assert!(config.stem_wait_timeout.is_none());
    }
}
