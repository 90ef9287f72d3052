//! Pipeline controller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use lyrvid_models::{unescape_newlines, TrackIdentity};

use crate::artifacts::{ensure_directories, purge_stale_videos, ArtifactSet};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::jobs::{run_render, run_separation};
use crate::ledger::UsageLedger;
use crate::selector::select_candidate;
use crate::services::{
    AudioDownloader, AudioSearch, LyricRenderer, LyricSource, MetadataLookup, SeparationEngine,
};

/// The five external collaborators the controller drives.
pub struct PipelineServices {
    pub metadata: Arc<dyn MetadataLookup>,
    pub search: Arc<dyn AudioSearch>,
    pub downloader: Arc<dyn AudioDownloader>,
    pub lyrics: Arc<dyn LyricSource>,
    pub separator: Arc<dyn SeparationEngine>,
    pub renderer: Arc<dyn LyricRenderer>,
}

/// Single-process production pipeline.
///
/// One request at a time flows through: metadata resolution, cache check,
/// search/select, download, lyric fetch, then the concurrent separation
/// and rendering jobs, cleanup, and the ledger write. Requests for the
/// same resolved identity are serialized through a per-identity lock so
/// concurrent callers await the first result instead of racing on files.
pub struct Pipeline {
    config: PipelineConfig,
    services: PipelineServices,
    ledger: UsageLedger,
    in_flight: Mutex<HashMap<TrackIdentity, Arc<Mutex<()>>>>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, services: PipelineServices) -> Self {
        let ledger = UsageLedger::new(config.ledger_path.clone());
        Self {
            config,
            services,
            ledger,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Produce the lyric video for a (title, artist) request.
    ///
    /// Returns the final video path. Intermediate artifacts are deleted
    /// only on success; a failed run leaves them in place for inspection.
    pub async fn produce(&self, title: &str, artist: &str) -> PipelineResult<PathBuf> {
        ensure_directories(&self.config).await?;
        if let Err(e) =
            purge_stale_videos(&self.config.videos_dir, self.config.video_retention).await
        {
            warn!("Video purge failed: {}", e);
        }

        info!(title, artist, "Resolving track metadata");
        let metadata = self
            .services
            .metadata
            .resolve(title, artist)
            .await?
            .ok_or_else(|| PipelineError::metadata_not_found(title, artist))?;
        let identity = metadata.identity.clone();

        // Serialize concurrent requests for the same identity; the second
        // caller lands on the cache check after the first finishes.
        let identity_lock = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry(identity.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let _guard = identity_lock.lock().await;

        let artifacts = ArtifactSet::resolve(&identity, &self.config);
        if artifacts.is_complete() {
            info!(track = %identity, "Artifacts already exist, serving from cache");
            self.ledger.record(&identity).await?;
            return Ok(artifacts.video_path);
        }

        info!(track = %identity, "Searching audio sources");
        let candidates = self
            .services
            .search
            .search(&identity, self.config.search_limit)
            .await?;
        let best = select_candidate(&candidates, metadata.duration_seconds)
            .ok_or(PipelineError::NoMatch)?;

        info!(track = %identity, url = %best.source_url, "Downloading audio source");
        self.services
            .downloader
            .download(&best.source_url, &artifacts.source_audio_path)
            .await?;

        info!(track = %identity, "Fetching lyrics");
        let raw_lyrics = self
            .services
            .lyrics
            .fetch(&identity)
            .await?
            .ok_or_else(|| PipelineError::LyricsNotFound(identity.clone()))?;
        tokio::fs::write(&artifacts.lyric_path, unescape_newlines(&raw_lyrics)).await?;

        info!(track = %identity, "Launching separation and rendering jobs");
        self.run_jobs(&artifacts).await?;

        info!(track = %identity, "Deleting intermediate files");
        artifacts.cleanup_intermediates().await;

        self.ledger.record(&identity).await?;
        info!(track = %identity, video = %artifacts.video_path.display(), "Production complete");
        Ok(artifacts.video_path)
    }

    /// Run the two jobs concurrently and await both.
    ///
    /// When one side fails the other is still awaited so no background
    /// work is orphaned; the separation error wins when both fail since
    /// the render failure is usually its consequence.
    async fn run_jobs(&self, artifacts: &ArtifactSet) -> PipelineResult<()> {
        let (stem_tx, stem_rx) = tokio::sync::oneshot::channel();

        let separation = {
            let engine = Arc::clone(&self.services.separator);
            let artifacts = artifacts.clone();
            tokio::spawn(async move { run_separation(engine, &artifacts, stem_tx).await })
        };
        let render = {
            let renderer = Arc::clone(&self.services.renderer);
            let artifacts = artifacts.clone();
            let wait_timeout = self.config.stem_wait_timeout;
            tokio::spawn(async move { run_render(renderer, &artifacts, stem_rx, wait_timeout).await })
        };

        let (separation_result, render_result) = tokio::join!(separation, render);

        flatten_job(separation_result)?;
        flatten_job(render_result)?;
        Ok(())
    }

    /// Aggregated usage counts from the ledger.
    pub async fn usage_counts(&self) -> PipelineResult<HashMap<String, u64>> {
        self.ledger.counts().await
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

fn flatten_job(
    joined: Result<PipelineResult<()>, tokio::task::JoinError>,
) -> PipelineResult<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(PipelineError::internal(format!("job task failed: {e}"))),
    }
}
