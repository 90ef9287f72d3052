//! Spotify track search for canonical metadata.

use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use lyrvid_models::{TrackIdentity, TrackMetadata};

use crate::error::{SourceError, SourceResult};

const DEFAULT_AUTH_BASE: &str = "https://accounts.spotify.com";
const DEFAULT_API_BASE: &str = "https://api.spotify.com";

/// Spotify application credentials for the client-credentials flow.
#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Spotify Web API client.
///
/// Resolves a (title, artist) query into canonical track metadata. A fresh
/// access token is fetched per lookup; this service handles one request at
/// a time, so token caching is not worth the invalidation handling.
pub struct SpotifyClient {
    http: Client,
    credentials: SpotifyCredentials,
    auth_base: String,
    api_base: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: SearchTracks,
}

#[derive(Deserialize)]
struct SearchTracks {
    items: Vec<TrackItem>,
}

#[derive(Deserialize)]
struct TrackItem {
    name: String,
    artists: Vec<ArtistItem>,
    duration_ms: u64,
}

#[derive(Deserialize)]
struct ArtistItem {
    name: String,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_base_urls(credentials, DEFAULT_AUTH_BASE, DEFAULT_API_BASE)
    }

    /// Create a client against explicit base URLs (used by tests).
    pub fn with_base_urls(
        credentials: SpotifyCredentials,
        auth_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            credentials,
            auth_base: auth_base.into(),
            api_base: api_base.into(),
        }
    }

    /// Fetch an access token via the client-credentials grant.
    async fn fetch_token(&self) -> SourceResult<String> {
        let basic = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let response = self
            .http
            .post(format!("{}/api/token", self.auth_base))
            .header("Authorization", format!("Basic {basic}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::auth(format!(
                "token request failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Fetched Spotify access token");
        Ok(token.access_token)
    }

    /// Resolve canonical metadata for a (title, artist) query.
    ///
    /// Returns `None` when the search yields no tracks.
    pub async fn resolve_track(
        &self,
        title: &str,
        artist: &str,
    ) -> SourceResult<Option<TrackMetadata>> {
        let token = self.fetch_token().await?;

        let response = self
            .http
            .get(format!("{}/v1/search", self.api_base))
            .header("Authorization", format!("Bearer {token}"))
            .query(&[("q", format!("{artist} {title}")), ("type", "track".to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::unexpected(format!(
                "track search failed with status {}",
                response.status()
            )));
        }

        let search: SearchResponse = response.json().await?;
        let Some(track) = search.tracks.items.into_iter().next() else {
            info!(title, artist, "No tracks found");
            return Ok(None);
        };

        let canonical_artist = track
            .artists
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or(artist);

        Ok(Some(TrackMetadata {
            identity: TrackIdentity::new(&track.name, canonical_artist),
            duration_seconds: track.duration_ms as f64 / 1000.0,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> SpotifyCredentials {
        SpotifyCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    async fn mock_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "access_token": "t0k3n" })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn resolves_first_track_hit() {
        let server = MockServer::start().await;
        mock_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": { "items": [{
                    "name": "Imagine",
                    "artists": [{ "name": "John Lennon" }],
                    "duration_ms": 183000
                }]}
            })))
            .mount(&server)
            .await;

        let client = SpotifyClient::with_base_urls(credentials(), server.uri(), server.uri());
        let metadata = client.resolve_track("imagine", "lennon").await.unwrap().unwrap();

        assert_eq!(metadata.identity, TrackIdentity::new("Imagine", "John Lennon"));
        assert_eq!(metadata.duration_seconds, 183.0);
    }

    #[tokio::test]
    async fn empty_search_is_not_found() {
        let server = MockServer::start().await;
        mock_token(&server).await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "tracks": { "items": [] } })),
            )
            .mount(&server)
            .await;

        let client = SpotifyClient::with_base_urls(credentials(), server.uri(), server.uri());
        assert!(client.resolve_track("x", "y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_rejection_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SpotifyClient::with_base_urls(credentials(), server.uri(), server.uri());
        let err = client.resolve_track("x", "y").await.unwrap_err();
        assert!(matches!(err, SourceError::Auth(_)));
    }
}
