//! External-tool wrappers for lyric-video production.
//!
//! This crate provides:
//! - Audio search and download via yt-dlp
//! - Type-safe FFmpeg command building
//! - Lyric frame rendering, silent-video assembly and audio muxing
//! - Vocal/instrumental separation via the Demucs CLI

pub mod command;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod render;
pub mod separate;

pub use command::FfmpegCommand;
pub use download::{download_audio, search_audio};
pub use error::{MediaError, MediaResult};
pub use render::{build_segments, mux_video_audio, render_silent_video, Segment};
pub use separate::DemucsSeparator;
