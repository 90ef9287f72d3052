//! Lyric frame rendering, silent-video assembly and muxing.
//!
//! The visual track is built frame-first: one PNG per distinct lyric text
//! (rendered once and reused for repeated lines), stitched together with
//! the concat demuxer into a silent video, then muxed with the instrumental
//! stem in a separate pass.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use lyrvid_models::LyricTrack;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Output frame size.
const FRAME_SIZE: &str = "1920x1080";
/// Output frame rate.
const FRAME_RATE: u32 = 24;
/// Font used for lyric text.
const FONT_FILE: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
/// Font size for lyric text.
const FONT_SIZE: u32 = 80;

/// One visual segment of the lyric video.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Lyric text, or `None` for a blank segment.
    pub text: Option<String>,
    /// On-screen duration in seconds.
    pub duration: f64,
}

/// Build the visual segment list for a lyric track.
///
/// A blank segment covers time 0 to the first timestamp; each line is shown
/// for the gap to the next timestamp; the last line falls back to the fixed
/// `trailing_seconds` duration.
pub fn build_segments(lyrics: &LyricTrack, trailing_seconds: f64) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(lyrics.len() + 1);

    let Some(first) = lyrics.first() else {
        return segments;
    };

    if first.timestamp_seconds > 0.0 {
        segments.push(Segment {
            text: None,
            duration: first.timestamp_seconds,
        });
    }

    for (i, line) in lyrics.iter().enumerate() {
        let duration = match lyrics.get(i + 1) {
            Some(next) => (next.timestamp_seconds - line.timestamp_seconds).max(0.0),
            None => trailing_seconds,
        };
        segments.push(Segment {
            text: Some(line.text.clone()),
            duration,
        });
    }

    segments
}

/// Escape text for use inside a drawtext filter expression.
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '\'' | ':' | '%' | ',') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render a single black 1920x1080 frame, optionally with centered text.
async fn render_frame(text: Option<&str>, out: &Path) -> MediaResult<()> {
    let mut cmd = FfmpegCommand::new(out)
        .pre_input_arg("-f")
        .pre_input_arg("lavfi")
        .input(format!("color=c=black:s={FRAME_SIZE}"))
        .single_frame();

    if let Some(text) = text {
        cmd = cmd.video_filter(format!(
            "drawtext=fontfile={FONT_FILE}:fontsize={FONT_SIZE}:fontcolor=white:\
             x=(w-text_w)/2:y=(h-text_h)/2:text='{}'",
            escape_drawtext(text)
        ));
    }

    cmd.run().await
}

/// Render the silent lyric video for `segments` into `output_path`.
///
/// Frames are rendered into `work_dir` once per distinct text and reused,
/// then assembled with the concat demuxer at a fixed frame rate.
pub async fn render_silent_video(
    segments: &[Segment],
    work_dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let work_dir = work_dir.as_ref();
    let output_path = output_path.as_ref();

    if segments.is_empty() {
        return Err(MediaError::ffmpeg_failed(
            "no segments to render",
            None,
            None,
        ));
    }

    fs::create_dir_all(work_dir).await?;

    // Frame cache: identical repeated text renders once.
    let mut frames: HashMap<Option<String>, PathBuf> = HashMap::new();
    for segment in segments {
        if frames.contains_key(&segment.text) {
            continue;
        }
        let frame_path = work_dir.join(format!("frame_{:04}.png", frames.len()));
        render_frame(segment.text.as_deref(), &frame_path).await?;
        frames.insert(segment.text.clone(), frame_path);
    }
    debug!(
        segments = segments.len(),
        distinct_frames = frames.len(),
        "Rendered lyric frames"
    );

    let mut list = String::from("ffconcat version 1.0\n");
    for segment in segments {
        let frame = &frames[&segment.text];
        writeln!(list, "file '{}'", frame.display()).expect("write to string");
        writeln!(list, "duration {:.3}", segment.duration).expect("write to string");
    }
    // The concat demuxer ignores the final duration unless the last entry
    // is repeated.
    if let Some(last) = segments.last() {
        writeln!(list, "file '{}'", frames[&last.text].display()).expect("write to string");
    }

    let list_path = work_dir.join("segments.ffconcat");
    fs::write(&list_path, list).await?;

    FfmpegCommand::new(output_path)
        .pre_input_arg("-f")
        .pre_input_arg("concat")
        .pre_input_arg("-safe")
        .pre_input_arg("0")
        .input_path(&list_path)
        .video_filter("format=yuv420p")
        .output_arg("-r")
        .output_arg(FRAME_RATE.to_string())
        .video_codec("libx264")
        .run()
        .await?;

    info!("Rendered silent lyric video: {}", output_path.display());
    Ok(())
}

/// Mux a silent video with an audio track into the final output.
///
/// The video stream is copied; audio is encoded to AAC and the output is
/// trimmed to the shorter of the two streams.
pub async fn mux_video_audio(
    video_path: impl AsRef<Path>,
    audio_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let video_path = video_path.as_ref();
    let audio_path = audio_path.as_ref();
    let output_path = output_path.as_ref();

    if !video_path.exists() {
        return Err(MediaError::FileNotFound(video_path.to_path_buf()));
    }
    if !audio_path.exists() {
        return Err(MediaError::FileNotFound(audio_path.to_path_buf()));
    }

    FfmpegCommand::new(output_path)
        .input_path(video_path)
        .input_path(audio_path)
        .video_codec("copy")
        .audio_codec("aac")
        .output_arg("-shortest")
        .run()
        .await?;

    info!("Muxed final video: {}", output_path.display());
    Ok(())
}
