//! Usage ledger records.

use crate::track::TrackIdentity;
use serde::{Deserialize, Serialize};

/// One completed production request, appended to the usage ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub identity: TrackIdentity,
}

impl UsageRecord {
    pub fn new(identity: TrackIdentity) -> Self {
        Self { identity }
    }

    /// Encode as one tab-delimited ledger row (no trailing newline).
    pub fn to_line(&self) -> String {
        format!("{}\t{}", self.identity.title, self.identity.artist)
    }

    /// Decode a ledger row. Returns `None` for rows that do not have
    /// exactly two tab-separated fields.
    pub fn from_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(2, '\t');
        let title = parts.next()?.trim();
        let artist = parts.next()?.trim();
        if title.is_empty() || artist.is_empty() {
            return None;
        }
        Some(Self {
            identity: TrackIdentity::new(title, artist),
        })
    }

    /// Aggregation key used by the usage counts endpoint.
    pub fn count_key(&self) -> String {
        self.identity.to_string()
    }
}
