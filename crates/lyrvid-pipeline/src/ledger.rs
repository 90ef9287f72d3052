//! Append-only usage ledger.

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use lyrvid_models::{TrackIdentity, UsageRecord};

use crate::error::PipelineResult;

/// Append-only log of completed requests.
///
/// Each pipeline run issues a single append at the very end; the mutex
/// still serializes writers so concurrent appends can never interleave
/// partial lines. Counts are derived state, recomputed by replaying rows.
pub struct UsageLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UsageLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append one completed request for `identity`.
    pub async fn record(&self, identity: &TrackIdentity) -> PipelineResult<()> {
        let record = UsageRecord::new(identity.clone());
        let line = format!("{}\n", record.to_line());

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        // One write per record keeps rows atomic under append mode.
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(track = %identity, "Recorded usage");
        Ok(())
    }

    /// Aggregate all rows into per-track counts keyed `"{title} - {artist}"`.
    pub async fn counts(&self) -> PipelineResult<HashMap<String, u64>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut counts = HashMap::new();
        for line in contents.lines() {
            match UsageRecord::from_line(line) {
                Some(record) => *counts.entry(record.count_key()).or_insert(0) += 1,
                None => warn!(line, "Skipping malformed ledger row"),
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn aggregates_counts_by_track() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.tsv"));

        let imagine = TrackIdentity::new("Imagine", "John Lennon");
        let hey_jude = TrackIdentity::new("Hey Jude", "The Beatles");

        ledger.record(&imagine).await.unwrap();
        ledger.record(&hey_jude).await.unwrap();
        ledger.record(&imagine).await.unwrap();

        let counts = ledger.counts().await.unwrap();
        assert_eq!(counts.get("Imagine - John Lennon"), Some(&2));
        assert_eq!(counts.get("Hey Jude - The Beatles"), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[tokio::test]
    async fn missing_ledger_file_counts_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("absent.tsv"));
        assert!(ledger.counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage.tsv");
        tokio::fs::write(&path, "Imagine\tJohn Lennon\ngarbage row\n")
            .await
            .unwrap();

        let ledger = UsageLedger::new(&path);
        let counts = ledger.counts().await.unwrap();
        assert_eq!(counts.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let ledger = std::sync::Arc::new(UsageLedger::new(dir.path().join("usage.tsv")));

        let mut handles = Vec::new();
        for i in 0..16 {
            let ledger = std::sync::Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let identity = TrackIdentity::new(format!("Track {}", i % 4), "Artist");
                ledger.record(&identity).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let counts = ledger.counts().await.unwrap();
        assert_eq!(counts.values().sum::<u64>(), 16);
    }
}
