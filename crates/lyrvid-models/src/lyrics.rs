//! LRC lyric parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// One timestamped lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub timestamp_seconds: f64,
    pub text: String,
}

/// Ordered sequence of lyric lines.
///
/// Lines are kept in input order; LRC payloads are already sorted by
/// timestamp, and duplicate timestamps are legal and preserved as-is.
pub type LyricTrack = Vec<LyricLine>;

fn lrc_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(\d+):(\d{1,2}(?:\.\d+)?)\](.*)$").expect("valid regex"))
}

/// Parse LRC text into a lyric track.
///
/// Lines not matching `[mm:ss.xx]text` are skipped with a warning; a single
/// malformed line never fails the parse.
pub fn parse_lrc(text: &str) -> LyricTrack {
    let re = lrc_line_regex();
    let mut lines = Vec::new();

    for raw in text.lines() {
        let raw = raw.trim_end();
        if raw.is_empty() {
            continue;
        }
        match re.captures(raw) {
            Some(caps) => {
                // Both groups are digit-only by construction.
                let minutes: f64 = caps[1].parse().unwrap_or(0.0);
                let seconds: f64 = caps[2].parse().unwrap_or(0.0);
                lines.push(LyricLine {
                    timestamp_seconds: minutes * 60.0 + seconds,
                    text: caps[3].trim().to_string(),
                });
            }
            None => {
                warn!(line = raw, "Skipping malformed lyric line");
            }
        }
    }

    lines
}

/// Replace literal `\n` escape sequences with real line breaks.
///
/// LRCLIB returns synced lyrics with escaped newlines inside a JSON string;
/// they must be unescaped before the LRC parse sees one line per row.
pub fn unescape_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamped_lines() {
        let track = parse_lrc("[01:02.50]Hello\n[01:05.00]World");
        assert_eq!(
            track,
            vec![
                LyricLine {
                    timestamp_seconds: 62.5,
                    text: "Hello".to_string()
                },
                LyricLine {
                    timestamp_seconds: 65.0,
                    text: "World".to_string()
                },
            ]
        );
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let track = parse_lrc("[00:01.00]One\nnot a lyric line\n[00:02.00]Two");
        assert_eq!(track.len(), 2);
        assert_eq!(track[1].text, "Two");
    }

    #[test]
    fn duplicate_timestamps_preserved_in_order() {
        let track = parse_lrc("[00:10.00]first\n[00:10.00]second");
        assert_eq!(track[0].text, "first");
        assert_eq!(track[1].text, "second");
    }

    #[test]
    fn whole_second_timestamps_accepted() {
        let track = parse_lrc("[02:03]Plain");
        assert_eq!(track[0].timestamp_seconds, 123.0);
    }

    #[test]
    fn unescapes_literal_newlines() {
        let raw = "[00:01.00]a\\n[00:02.00]b";
        let track = parse_lrc(&unescape_newlines(raw));
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn empty_input_parses_empty() {
        assert!(parse_lrc("").is_empty());
    }
}
