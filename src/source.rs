//! Snapshot sources
//!
//! The device/ingestion collaborator is modelled as a [`MetricsSource`] that
//! either yields a complete snapshot or fails with a transport error. This
//! module also parses snapshots from JSON and NDJSON at the crate boundary.

use std::collections::VecDeque;

use crate::error::{Result, TransportError, VitalsError};
use crate::types::MetricsSnapshot;

/// Anything that can produce a completed metrics snapshot
pub trait MetricsSource {
    /// Fetch the next snapshot. A failure must not yield partial data.
    fn fetch(&mut self) -> std::result::Result<MetricsSnapshot, TransportError>;
}

/// Source replaying pre-recorded snapshots in order.
///
/// Once exhausted every fetch fails with `TransportError::NotConnected`.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    queue: VecDeque<std::result::Result<MetricsSnapshot, TransportError>>,
}

impl ReplaySource {
    pub fn new(snapshots: impl IntoIterator<Item = MetricsSnapshot>) -> Self {
        Self {
            queue: snapshots.into_iter().map(Ok).collect(),
        }
    }

    /// Queue a failure to be returned by a later fetch
    pub fn push_failure(&mut self, error: TransportError) {
        self.queue.push_back(Err(error));
    }

    pub fn push(&mut self, snapshot: MetricsSnapshot) {
        self.queue.push_back(Ok(snapshot));
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl MetricsSource for ReplaySource {
    fn fetch(&mut self) -> std::result::Result<MetricsSnapshot, TransportError> {
        self.queue
            .pop_front()
            .unwrap_or(Err(TransportError::NotConnected))
    }
}

/// Parse a single snapshot object
pub fn parse_snapshot(json: &str) -> Result<MetricsSnapshot> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a JSON array of snapshots
pub fn parse_snapshot_array(json: &str) -> Result<Vec<MetricsSnapshot>> {
    Ok(serde_json::from_str(json)?)
}

/// Parse NDJSON (one snapshot per line); blank lines are skipped
pub fn parse_snapshot_ndjson(ndjson: &str) -> Result<Vec<MetricsSnapshot>> {
    let mut snapshots = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<MetricsSnapshot>(trimmed) {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => {
                return Err(VitalsError::Parse(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{at_day, snapshot};

    #[test]
    fn test_replay_source_order_and_exhaustion() {
        let mut source = ReplaySource::new(vec![snapshot(1), snapshot(2)]);
        source.push_failure(TransportError::Timeout);

        assert_eq!(source.fetch().unwrap().timestamp, at_day(1));
        assert_eq!(source.fetch().unwrap().timestamp, at_day(2));
        assert_eq!(source.fetch().unwrap_err(), TransportError::Timeout);
        assert_eq!(source.fetch().unwrap_err(), TransportError::NotConnected);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let a = serde_json::to_string(&snapshot(1)).unwrap();
        let b = serde_json::to_string(&snapshot(2)).unwrap();
        let input = format!("{}\n\n  \n{}\n", a, b);

        let parsed = parse_snapshot_ndjson(&input).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1], snapshot(2));
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let a = serde_json::to_string(&snapshot(1)).unwrap();
        let input = format!("{}\n{{\"broken\": true}}\n", a);

        let err = parse_snapshot_ndjson(&input).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_array_and_single() {
        let json = serde_json::to_string(&vec![snapshot(1), snapshot(2)]).unwrap();
        assert_eq!(parse_snapshot_array(&json).unwrap().len(), 2);

        let one = serde_json::to_string(&snapshot(3)).unwrap();
        assert_eq!(parse_snapshot(&one).unwrap(), snapshot(3));
        assert!(matches!(parse_snapshot("[]"), Err(VitalsError::Json(_))));
    }
}
