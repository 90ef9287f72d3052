//! Production adapters over the real clients and tools.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use lyrvid_media::{build_segments, download_audio, mux_video_audio, render_silent_video,
    search_audio, DemucsSeparator};
use lyrvid_models::{Candidate, LyricTrack, TrackIdentity, TrackMetadata};
use lyrvid_sources::{LrclibClient, SpotifyClient, SpotifyCredentials};

use crate::config::PipelineConfig;
use crate::controller::PipelineServices;
use crate::error::{PipelineError, PipelineResult};
use crate::services::{
    AudioDownloader, AudioSearch, LyricRenderer, LyricSource, MetadataLookup, SeparationEngine,
};

/// Metadata lookup backed by the Spotify track search.
pub struct SpotifyMetadata(pub SpotifyClient);

#[async_trait]
impl MetadataLookup for SpotifyMetadata {
    async fn resolve(&self, title: &str, artist: &str) -> PipelineResult<Option<TrackMetadata>> {
        self.0
            .resolve_track(title, artist)
            .await
            .map_err(|e| PipelineError::lookup_failed(e.to_string()))
    }
}

/// Audio search and download through yt-dlp.
pub struct YtDlpAudio {
    pub cookies_path: Option<PathBuf>,
}

#[async_trait]
impl AudioSearch for YtDlpAudio {
    async fn search(
        &self,
        identity: &TrackIdentity,
        limit: usize,
    ) -> PipelineResult<Vec<Candidate>> {
        let query = format!("{} {}", identity.title, identity.artist);
        search_audio(&query, limit)
            .await
            .map_err(|e| PipelineError::lookup_failed(e.to_string()))
    }
}

#[async_trait]
impl AudioDownloader for YtDlpAudio {
    async fn download(&self, source_url: &str, dest: &Path) -> PipelineResult<()> {
        download_audio(source_url, dest, self.cookies_path.as_deref())
            .await
            .map_err(|e| PipelineError::download_failed(e.to_string()))
    }
}

/// Synced lyric fetch backed by LRCLIB.
pub struct LrclibLyrics(pub LrclibClient);

#[async_trait]
impl LyricSource for LrclibLyrics {
    async fn fetch(&self, identity: &TrackIdentity) -> PipelineResult<Option<String>> {
        self.0
            .fetch_synced(&identity.title, &identity.artist, None, None)
            .await
            .map_err(|e| PipelineError::lookup_failed(e.to_string()))
    }
}

/// Separation engine backed by the Demucs CLI.
pub struct DemucsSeparation(pub DemucsSeparator);

#[async_trait]
impl SeparationEngine for DemucsSeparation {
    async fn separate(
        &self,
        source: &Path,
        vocals_out: &Path,
        instrumental_out: &Path,
    ) -> PipelineResult<()> {
        self.0
            .separate(source, vocals_out, instrumental_out)
            .await
            .map_err(|e| PipelineError::separation_failed(e.to_string()))
    }
}

/// Renderer backed by FFmpeg frame/concat/mux passes.
pub struct FfmpegLyricRenderer {
    pub trailing_segment_seconds: f64,
}

#[async_trait]
impl LyricRenderer for FfmpegLyricRenderer {
    async fn render_silent(&self, lyrics: &LyricTrack, output: &Path) -> PipelineResult<()> {
        let segments = build_segments(lyrics, self.trailing_segment_seconds);
        if segments.is_empty() {
            return Err(PipelineError::render_failed("no renderable lyric lines"));
        }

        let work_dir = TempDir::new()?;
        render_silent_video(&segments, work_dir.path(), output)
            .await
            .map_err(|e| PipelineError::render_failed(e.to_string()))
    }

    async fn mux(&self, silent_video: &Path, audio: &Path, output: &Path) -> PipelineResult<()> {
        mux_video_audio(silent_video, audio, output)
            .await
            .map_err(|e| PipelineError::render_failed(e.to_string()))
    }
}

/// Wire up the production service set from config.
pub fn production_services(config: &PipelineConfig) -> PipelineServices {
    let spotify = SpotifyClient::new(SpotifyCredentials {
        client_id: config.spotify_client_id.clone(),
        client_secret: config.spotify_client_secret.clone(),
    });

    PipelineServices {
        metadata: Arc::new(SpotifyMetadata(spotify)),
        search: Arc::new(YtDlpAudio {
            cookies_path: config.cookies_path.clone(),
        }),
        downloader: Arc::new(YtDlpAudio {
            cookies_path: config.cookies_path.clone(),
        }),
        lyrics: Arc::new(LrclibLyrics(LrclibClient::new())),
        separator: Arc::new(DemucsSeparation(DemucsSeparator::new())),
        renderer: Arc::new(FfmpegLyricRenderer {
            trailing_segment_seconds: config.trailing_segment_seconds,
        }),
    }
}
