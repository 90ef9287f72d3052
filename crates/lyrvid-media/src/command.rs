//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
///
/// Supports multiple inputs so the same builder covers frame rendering,
/// concat assembly and the final video/audio mux.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Arguments preceding the input list (e.g. `-f lavfi`)
    pre_input_args: Vec<String>,
    /// Input file paths or lavfi specs, each emitted as `-i <input>`
    inputs: Vec<String>,
    /// Output arguments (after the inputs)
    output_args: Vec<String>,
    /// Output file path
    output: PathBuf,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command producing `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            pre_input_args: Vec::new(),
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an argument before the input list.
    pub fn pre_input_arg(mut self, arg: impl Into<String>) -> Self {
        self.pre_input_args.push(arg.into());
        self
    }

    /// Add an input (file path or lavfi source spec).
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Add an input file path.
    pub fn input_path(self, path: impl AsRef<Path>) -> Self {
        self.input(path.as_ref().to_string_lossy().into_owned())
    }

    /// Add an output argument (after the inputs).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Extract a single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-frames:v").output_arg("1")
    }

    /// Build the full argument vector.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.pre_input_args.clone());

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.clone());
        }

        args.extend(self.output_args.clone());
        args.push(self.output.to_string_lossy().into_owned());

        args
    }

    /// Run the command to completion, capturing stderr for diagnostics.
    pub async fn run(&self) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = self.build_args();
        debug!(args = ?args, "Running ffmpeg");

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(MediaError::ffmpeg_failed(
                format!("ffmpeg exited with {}", output.status),
                Some(stderr),
                output.status.code(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_args_in_order() {
        let cmd = FfmpegCommand::new("/tmp/out.mp4")
            .pre_input_arg("-f")
            .pre_input_arg("lavfi")
            .input("color=c=black:s=1920x1080")
            .input_path("/tmp/audio.wav")
            .video_codec("libx264")
            .audio_codec("aac");

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert_eq!(&args[2..5], ["error", "-f", "lavfi"]);

        let first_i = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[first_i + 1], "color=c=black:s=1920x1080");
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"-c:a".to_string()));
    }

    #[test]
    fn single_frame_adds_frame_limit() {
        let args = FfmpegCommand::new("/tmp/frame.png")
            .input("color=c=black:s=16x16")
            .single_frame()
            .build_args();
        let pos = args.iter().position(|a| a == "-frames:v").unwrap();
        assert_eq!(args[pos + 1], "1");
    }
}
