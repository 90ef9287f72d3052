//! Lyric-video production pipeline.
//!
//! The pipeline turns a (song title, artist) request into a rendered lyric
//! video: it resolves canonical metadata, picks a matching audio source,
//! separates vocals from instrumentals, renders lyric visuals, muxes the
//! result and records usage, while deduplicating work by track identity.

pub mod adapters;
pub mod artifacts;
pub mod config;
pub mod controller;
pub mod error;
pub mod jobs;
pub mod ledger;
pub mod selector;
pub mod services;

pub use artifacts::ArtifactSet;
pub use config::PipelineConfig;
pub use controller::{Pipeline, PipelineServices};
pub use error::{PipelineError, PipelineResult};
pub use ledger::UsageLedger;
pub use selector::select_candidate;
pub use services::{
    AudioDownloader, AudioSearch, LyricRenderer, LyricSource, MetadataLookup, SeparationEngine,
};
