//! Vocal/instrumental separation via the Demucs CLI.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::move_file;

/// Demucs model used for two-stem separation.
const DEMUCS_MODEL: &str = "mdx_extra";

/// Two-stem separation engine shelling out to `demucs`.
#[derive(Debug, Clone, Default)]
pub struct DemucsSeparator;

impl DemucsSeparator {
    pub fn new() -> Self {
        Self
    }

    /// Split `input` into a vocal and an instrumental stem.
    ///
    /// Demucs writes into its own `<out>/<model>/<track>/` layout inside a
    /// temp directory; the two stems are moved to the requested paths
    /// afterwards so callers control the on-disk contract.
    pub async fn separate(
        &self,
        input: impl AsRef<Path>,
        vocals_out: impl AsRef<Path>,
        instrumental_out: impl AsRef<Path>,
    ) -> MediaResult<()> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        which::which("demucs").map_err(|_| MediaError::DemucsNotFound)?;

        let work_dir = TempDir::new()?;
        info!("Separating stems for {}", input.display());

        let output = Command::new("demucs")
            .args(["-n", DEMUCS_MODEL, "--two-stems", "vocals", "-o"])
            .arg(work_dir.path())
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(MediaError::separation_failed(
                format!("demucs exited with {}", output.status),
                Some(stderr),
            ));
        }

        let track_dir = demucs_track_dir(work_dir.path(), input);
        let vocals_src = track_dir.join("vocals.wav");
        let instrumental_src = track_dir.join("no_vocals.wav");

        if !vocals_src.exists() || !instrumental_src.exists() {
            return Err(MediaError::separation_failed(
                format!(
                    "demucs completed but stems are missing under {}",
                    track_dir.display()
                ),
                None,
            ));
        }

        move_file(&vocals_src, vocals_out.as_ref()).await?;
        move_file(&instrumental_src, instrumental_out.as_ref()).await?;

        debug!(
            vocals = %vocals_out.as_ref().display(),
            instrumental = %instrumental_out.as_ref().display(),
            "Separation complete"
        );
        Ok(())
    }
}

/// Directory demucs writes a track's stems into: `<out>/<model>/<stem>/`.
fn demucs_track_dir(out_root: &Path, input: &Path) -> PathBuf {
    let track_stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_root.join(DEMUCS_MODEL).join(track_stem)
}
