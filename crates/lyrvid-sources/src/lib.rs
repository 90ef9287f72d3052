//! HTTP clients for the external lookup services.
//!
//! This crate provides:
//! - Spotify track search for canonical metadata (client-credentials flow)
//! - LRCLIB synced lyric fetch

pub mod error;
pub mod lrclib;
pub mod spotify;

pub use error::{SourceError, SourceResult};
pub use lrclib::LrclibClient;
pub use spotify::{SpotifyClient, SpotifyCredentials};
