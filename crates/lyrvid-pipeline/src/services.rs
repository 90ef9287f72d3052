//! Collaborator interfaces for the external services.
//!
//! The pipeline only needs these seams; production adapters over the real
//! clients live in [`crate::adapters`], and integration tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use std::path::Path;

use lyrvid_models::{Candidate, LyricTrack, TrackIdentity, TrackMetadata};

use crate::error::PipelineResult;

/// Canonical track metadata lookup.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Resolve a raw (title, artist) query. `Ok(None)` means not found.
    async fn resolve(&self, title: &str, artist: &str) -> PipelineResult<Option<TrackMetadata>>;
}

/// Audio source search returning an ordered, bounded candidate list.
#[async_trait]
pub trait AudioSearch: Send + Sync {
    async fn search(
        &self,
        identity: &TrackIdentity,
        limit: usize,
    ) -> PipelineResult<Vec<Candidate>>;
}

/// Audio download to a deterministic destination path.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    async fn download(&self, source_url: &str, dest: &Path) -> PipelineResult<()>;
}

/// Timestamped lyric text lookup. `Ok(None)` means not found.
#[async_trait]
pub trait LyricSource: Send + Sync {
    async fn fetch(&self, identity: &TrackIdentity) -> PipelineResult<Option<String>>;
}

/// Vocal/instrumental separation engine.
#[async_trait]
pub trait SeparationEngine: Send + Sync {
    /// Split `source` into exactly two stem files at the given paths.
    async fn separate(
        &self,
        source: &Path,
        vocals_out: &Path,
        instrumental_out: &Path,
    ) -> PipelineResult<()>;
}

/// Lyric-video renderer: silent visual track first, then the audio mux.
#[async_trait]
pub trait LyricRenderer: Send + Sync {
    async fn render_silent(&self, lyrics: &LyricTrack, output: &Path) -> PipelineResult<()>;

    async fn mux(&self, silent_video: &Path, audio: &Path, output: &Path) -> PipelineResult<()>;
}
