//! Audio source search candidates.

use serde::{Deserialize, Serialize};

/// One result from the audio search service.
///
/// Deserialized directly from yt-dlp `--dump-json` output, which may omit
/// the duration or uploader for some entries. Candidates are ephemeral and
/// exist only during selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Duration in seconds, if the source reported one.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Uploader/channel name, if known.
    #[serde(default)]
    pub uploader: Option<String>,
    /// Downloadable page URL.
    #[serde(rename = "webpage_url")]
    pub source_url: String,
}

impl Candidate {
    /// Duration used for matching; missing durations count as zero, which
    /// the distance comparison naturally deprioritizes.
    pub fn duration_or_zero(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    /// Uploader name, or empty when unknown.
    pub fn uploader_name(&self) -> &str {
        self.uploader.as_deref().unwrap_or("")
    }
}
