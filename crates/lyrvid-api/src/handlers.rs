//! Request handlers.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query for the song production endpoint.
#[derive(Debug, Deserialize)]
pub struct SongQuery {
    pub song_name: String,
    pub artist_name: String,
}

/// Produced video response.
#[derive(Serialize)]
pub struct SongResponse {
    pub video_file: String,
}

/// Produce (or serve the cached) lyric video for a track.
pub async fn get_song(
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Json<SongResponse>> {
    if query.song_name.trim().is_empty() || query.artist_name.trim().is_empty() {
        return Err(ApiError::bad_request("song_name and artist_name are required"));
    }

    info!(song = %query.song_name, artist = %query.artist_name, "Song request");
    let video = state
        .pipeline
        .produce(&query.song_name, &query.artist_name)
        .await?;

    Ok(Json(SongResponse {
        video_file: video.to_string_lossy().into_owned(),
    }))
}

/// Query for the raw lyric endpoint.
#[derive(Debug, Deserialize)]
pub struct LyricsQuery {
    pub track_name: String,
    pub artist_name: String,
    pub album_name: Option<String>,
    pub duration: Option<u64>,
}

#[derive(Serialize)]
pub struct LyricsResponse {
    pub synced_lyrics: String,
}

/// Fetch raw synced lyrics without producing a video.
pub async fn get_lyrics(
    State(state): State<AppState>,
    Query(query): Query<LyricsQuery>,
) -> ApiResult<Json<LyricsResponse>> {
    let lyrics = state
        .lyrics
        .fetch_synced(
            &query.track_name,
            &query.artist_name,
            query.album_name.as_deref(),
            query.duration,
        )
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No lyrics found for \"{}\" by \"{}\"",
                query.track_name, query.artist_name
            ))
        })?;

    Ok(Json(LyricsResponse {
        synced_lyrics: lyrvid_models::unescape_newlines(&lyrics),
    }))
}

/// Aggregated usage counts keyed `"{title} - {artist}"`.
pub async fn get_usage(State(state): State<AppState>) -> ApiResult<Json<HashMap<String, u64>>> {
    Ok(Json(state.pipeline.usage_counts().await?))
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
