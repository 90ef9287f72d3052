//! The two concurrent production jobs.
//!
//! Separation and rendering run as sibling tasks once their inputs exist.
//! They share no memory; the instrumental handoff is an explicit oneshot
//! completion signal the separation job resolves on success, while the
//! stem files are still written at their contracted paths.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{info, warn};

use lyrvid_media::fs_utils::remove_if_exists;
use lyrvid_models::parse_lrc;

use crate::artifacts::ArtifactSet;
use crate::error::{PipelineError, PipelineResult};
use crate::services::{LyricRenderer, SeparationEngine};

/// Sender half of the instrumental completion signal.
pub type StemSignal = oneshot::Sender<std::path::PathBuf>;
/// Receiver half of the instrumental completion signal.
pub type StemReady = oneshot::Receiver<std::path::PathBuf>;

/// Run the separation job.
///
/// Idempotent: when both stems already exist the engine is not invoked.
/// The signal is resolved with the instrumental path on success; on any
/// failure the sender is dropped, which the rendering job observes as a
/// closed channel.
pub async fn run_separation(
    engine: Arc<dyn SeparationEngine>,
    artifacts: &ArtifactSet,
    done: StemSignal,
) -> PipelineResult<()> {
    if artifacts.vocals_path.exists() && artifacts.instrumental_path.exists() {
        info!(
            "Stems already exist for {}, skipping separation",
            artifacts.instrumental_path.display()
        );
        let _ = done.send(artifacts.instrumental_path.clone());
        return Ok(());
    }

    if !artifacts.source_audio_path.exists() {
        return Err(PipelineError::MissingInput(
            artifacts.source_audio_path.clone(),
        ));
    }

    engine
        .separate(
            &artifacts.source_audio_path,
            &artifacts.vocals_path,
            &artifacts.instrumental_path,
        )
        .await?;

    info!("Audio separation completed");
    let _ = done.send(artifacts.instrumental_path.clone());
    Ok(())
}

/// Run the rendering job.
///
/// Renders the silent visual track, then suspends until the separation
/// job signals the instrumental stem (bounded by `stem_wait_timeout` when
/// configured), muxes the final video and deletes the silent temp file.
pub async fn run_render(
    renderer: Arc<dyn LyricRenderer>,
    artifacts: &ArtifactSet,
    stem_ready: StemReady,
    stem_wait_timeout: Option<Duration>,
) -> PipelineResult<()> {
    let raw = tokio::fs::read_to_string(&artifacts.lyric_path)
        .await
        .map_err(|source| PipelineError::LyricParse {
            path: artifacts.lyric_path.clone(),
            source,
        })?;
    let lyrics = parse_lrc(&raw);

    let silent_path = artifacts.silent_video_path();
    renderer.render_silent(&lyrics, &silent_path).await?;
    info!("Video rendering without audio completed");

    let instrumental = await_stem(stem_ready, stem_wait_timeout).await?;

    renderer
        .mux(&silent_path, &instrumental, &artifacts.video_path)
        .await?;

    if let Err(e) = remove_if_exists(&silent_path).await {
        warn!(
            "Failed to delete silent video {}: {}",
            silent_path.display(),
            e
        );
    }

    Ok(())
}

async fn await_stem(
    stem_ready: StemReady,
    wait_timeout: Option<Duration>,
) -> PipelineResult<std::path::PathBuf> {
    let received = match wait_timeout {
        Some(bound) => timeout(bound, stem_ready).await.map_err(|_| {
            PipelineError::render_failed(format!(
                "timed out after {}s waiting for the instrumental stem",
                bound.as_secs()
            ))
        })?,
        None => stem_ready.await,
    };

    received.map_err(|_| {
        PipelineError::render_failed("separation ended without producing an instrumental stem")
    })
}
