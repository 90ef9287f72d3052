//! Track identity and canonical metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized (title, artist) pair.
///
/// This is the cache and deduplication key for the whole pipeline: every
/// artifact path is derived from it, so two requests that resolve to the
/// same pair always map to the same files on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIdentity {
    pub title: String,
    pub artist: String,
}

impl TrackIdentity {
    /// Create a normalized identity.
    ///
    /// Normalization trims surrounding whitespace and collapses internal
    /// whitespace runs, so `" Hey  Jude "` and `"Hey Jude"` resolve to the
    /// same identity.
    pub fn new(title: impl AsRef<str>, artist: impl AsRef<str>) -> Self {
        Self {
            title: normalize(title.as_ref()),
            artist: normalize(artist.as_ref()),
        }
    }

    /// Filename stem shared by every artifact of this track.
    ///
    /// Path separators are replaced so a title like "AC/DC" cannot escape
    /// the artifact directories.
    pub fn file_stem(&self) -> String {
        format!("{} - {}", self.title, self.artist)
            .replace(['/', '\\'], "_")
    }
}

impl fmt::Display for TrackIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical track metadata returned by the metadata lookup.
///
/// Fetched once per request and used only as the duration target for
/// candidate selection; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub identity: TrackIdentity,
    /// Canonical duration in seconds.
    pub duration_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_normalizes_whitespace() {
        let a = TrackIdentity::new("  Hey   Jude ", "The  Beatles");
        let b = TrackIdentity::new("Hey Jude", "The Beatles");
        assert_eq!(a, b);
        assert_eq!(a.file_stem(), "Hey Jude - The Beatles");
    }

    #[test]
    fn file_stem_strips_path_separators() {
        let id = TrackIdentity::new("Back in Black", "AC/DC");
        assert_eq!(id.file_stem(), "Back in Black - AC_DC");
    }

    #[test]
    fn same_pair_same_stem() {
        let a = TrackIdentity::new("Imagine", "John Lennon");
        let b = TrackIdentity::new("Imagine", "John Lennon");
        assert_eq!(a.file_stem(), b.file_stem());
    }
}
