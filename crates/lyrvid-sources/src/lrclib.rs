//! Synced lyric fetch from LRCLIB.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::info;

use crate::error::{SourceError, SourceResult};

const DEFAULT_BASE: &str = "https://lrclib.net";

/// LRCLIB API client.
pub struct LrclibClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LyricResponse {
    synced_lyrics: Option<String>,
}

impl Default for LrclibClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LrclibClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE)
    }

    /// Create a client against an explicit base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch raw synced lyrics for a track.
    ///
    /// The optional album name and duration narrow the lookup the same way
    /// the public API documents. Returns `None` when no synced lyrics exist
    /// for the track. The returned text may contain literal `\n` sequences;
    /// callers unescape before parsing.
    pub async fn fetch_synced(
        &self,
        track_name: &str,
        artist_name: &str,
        album_name: Option<&str>,
        duration_seconds: Option<u64>,
    ) -> SourceResult<Option<String>> {
        let mut query: Vec<(&str, String)> = vec![
            ("artist_name", artist_name.to_string()),
            ("track_name", track_name.to_string()),
        ];
        if let Some(album) = album_name {
            query.push(("album_name", album.to_string()));
        }
        if let Some(duration) = duration_seconds {
            query.push(("duration", duration.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/api/get", self.base_url))
            .query(&query)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!(track_name, artist_name, "No lyrics found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::unexpected(format!(
                "lyric fetch failed with status {}",
                response.status()
            )));
        }

        let body: LyricResponse = response.json().await?;
        Ok(body.synced_lyrics)
    }
}
