//! Shared data models for the Lyrvid backend.
//!
//! This crate provides:
//! - Track identity and canonical metadata types
//! - Search candidates for audio source selection
//! - LRC lyric parsing into timestamped lines
//! - Usage ledger records

pub mod candidate;
pub mod lyrics;
pub mod track;
pub mod usage;

pub use candidate::Candidate;
pub use lyrics::{parse_lrc, unescape_newlines, LyricLine, LyricTrack};
pub use track::{TrackIdentity, TrackMetadata};
pub use usage::UsageRecord;
