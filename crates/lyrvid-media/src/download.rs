//! Audio search and download using yt-dlp.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use lyrvid_models::Candidate;

use crate::error::{MediaError, MediaResult};

/// Minimum audio file size to consider an existing download complete.
const MIN_AUDIO_FILE_SIZE: u64 = 256 * 1024;

/// Minimum size for a valid cookies file (bytes).
const MIN_COOKIES_FILE_SIZE: u64 = 50;

/// Validate that a cookies file appears to be in Netscape format.
///
/// Netscape cookies files either start with a cookie-file header or contain
/// tab-separated lines with at least six fields.
fn is_valid_netscape_cookies(content: &str) -> bool {
    if content.starts_with("# Netscape HTTP Cookie File")
        || content.starts_with("# HTTP Cookie File")
    {
        return true;
    }

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.split('\t').count() >= 6 {
            return true;
        }
    }

    false
}

/// Check a configured cookies file and return it only when usable.
async fn usable_cookies_path(cookies: Option<&Path>) -> Option<String> {
    let path = cookies?;

    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(_) => {
            debug!("Cookies file not found at {}, skipping", path.display());
            return None;
        }
    };
    if metadata.len() < MIN_COOKIES_FILE_SIZE {
        debug!(
            "Cookies file {} is too small ({} bytes), skipping",
            path.display(),
            metadata.len()
        );
        return None;
    }

    match tokio::fs::read_to_string(path).await {
        Ok(content) if is_valid_netscape_cookies(&content) => {
            info!("Using cookies file for audio source authentication");
            Some(path.to_string_lossy().into_owned())
        }
        Ok(_) => {
            debug!(
                "Cookies file {} is not in valid Netscape format, skipping",
                path.display()
            );
            None
        }
        Err(e) => {
            warn!("Failed to read cookies file: {}", e);
            None
        }
    }
}

/// Search for audio source candidates.
///
/// Runs `yt-dlp --dump-json` over a bounded `ytsearch` query; each stdout
/// line is one JSON entry. Entries that fail to parse are skipped.
pub async fn search_audio(query: &str, limit: usize) -> MediaResult<Vec<Candidate>> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    let search_spec = format!("ytsearch{limit}:{query}");
    info!(query, limit, "Searching audio sources");

    let output = Command::new("yt-dlp")
        .args(["--dump-json", "--no-download", "--no-playlist"])
        .arg(&search_spec)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::download_failed(format!(
            "yt-dlp search exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut candidates = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Candidate>(line) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => warn!("Skipping unparsable search entry: {}", e),
        }
    }

    debug!(count = candidates.len(), "Search complete");
    Ok(candidates)
}

/// Download the best audio stream of `url` as an mp3 at `output_path`.
///
/// Skips the download when the file already exists and is non-trivially
/// sized; an undersized leftover is removed and re-downloaded.
pub async fn download_audio(
    url: &str,
    output_path: impl AsRef<Path>,
    cookies: Option<&Path>,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();

    if output_path.exists() {
        if let Ok(metadata) = output_path.metadata() {
            if metadata.len() > MIN_AUDIO_FILE_SIZE {
                info!("Using existing audio file: {}", output_path.display());
                return Ok(());
            }
            warn!(
                "Existing file {} is too small ({} bytes), re-downloading",
                output_path.display(),
                metadata.len()
            );
            tokio::fs::remove_file(output_path).await?;
        }
    }

    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    info!("Downloading audio from {} to {}", url, output_path.display());

    // yt-dlp appends the post-processed extension itself.
    let out_template = output_path.with_extension("%(ext)s");

    let mut args: Vec<String> = vec![
        "-f".into(),
        "bestaudio/best".into(),
        "-x".into(),
        "--audio-format".into(),
        "mp3".into(),
        "--audio-quality".into(),
        "192K".into(),
        "--no-playlist".into(),
        "-o".into(),
        out_template.to_string_lossy().into_owned(),
    ];

    if let Some(cookies_path) = usable_cookies_path(cookies).await {
        args.push("--cookies".into());
        args.push(cookies_path);
    }

    let output = Command::new("yt-dlp")
        .args(&args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::download_failed(format!(
            "yt-dlp exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    if !output_path.exists() {
        return Err(MediaError::download_failed(format!(
            "yt-dlp reported success but {} was not produced",
            output_path.display()
        )));
    }

    info!("Downloaded: {}", url);
    Ok(())
}
