//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

use lyrvid_models::TrackIdentity;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by the production pipeline.
///
/// Lookup/search/fetch failures abort the pipeline immediately; none are
/// retried. Cleanup failures are never errors, only warnings.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Track metadata not found for \"{title}\" by \"{artist}\"")]
    MetadataNotFound { title: String, artist: String },

    #[error("No acceptable audio source candidate")]
    NoMatch,

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Lyrics not found for {0}")]
    LyricsNotFound(TrackIdentity),

    #[error("Separation input missing: {0}")]
    MissingInput(PathBuf),

    #[error("Separation failed: {0}")]
    SeparationFailed(String),

    #[error("Lyric file unreadable: {path}: {source}")]
    LyricParse {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn metadata_not_found(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self::MetadataNotFound {
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn separation_failed(msg: impl Into<String>) -> Self {
        Self::SeparationFailed(msg.into())
    }

    pub fn render_failed(msg: impl Into<String>) -> Self {
        Self::RenderFailed(msg.into())
    }

    pub fn lookup_failed(msg: impl Into<String>) -> Self {
        Self::LookupFailed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for the "nothing to build from" outcomes a caller should see
    /// as a structured not-found rather than a server fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MetadataNotFound { .. } | Self::NoMatch | Self::LyricsNotFound(_)
        )
    }
}
