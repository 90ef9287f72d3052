//! API routes.

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{get_lyrics, get_song, get_usage, health};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/song", get(get_song))
        .route("/lyrics", get(get_lyrics))
        .route("/usage", get(get_usage))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
