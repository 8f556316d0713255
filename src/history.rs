//! Metrics history
//!
//! Bounded, chronologically ordered store of metrics snapshots. Appending past
//! capacity evicts the oldest entry. Snapshots must arrive with strictly
//! increasing timestamps; anything else is rejected and the store is left as is.

use std::collections::VecDeque;

use tracing::warn;

use crate::error::{Result, VitalsError};
use crate::types::MetricsSnapshot;

/// Default number of snapshots retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Ring buffer of recent snapshots, oldest first
#[derive(Debug, Clone)]
pub struct MetricsHistory {
    entries: VecDeque<MetricsSnapshot>,
    capacity: usize,
}

impl Default for MetricsHistory {
    fn default() -> Self {
        Self {
            entries: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MetricsHistory {
    /// Create a history retaining at most `capacity` snapshots
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(VitalsError::Configuration(
                "history capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Check that `snapshot` could be appended without mutating anything
    pub fn check_order(&self, snapshot: &MetricsSnapshot) -> Result<()> {
        match self.entries.back() {
            Some(tail) if snapshot.timestamp <= tail.timestamp => {
                warn!(
                    previous = %tail.timestamp,
                    received = %snapshot.timestamp,
                    "rejecting out-of-order snapshot"
                );
                Err(VitalsError::OutOfOrder {
                    previous: tail.timestamp,
                    received: snapshot.timestamp,
                })
            }
            _ => Ok(()),
        }
    }

    /// Append a snapshot at the tail, returning the evicted entry if the store was full
    pub fn append(&mut self, snapshot: MetricsSnapshot) -> Result<Option<MetricsSnapshot>> {
        self.check_order(&snapshot)?;

        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(snapshot);
        Ok(evicted)
    }

    /// Last `min(n, len)` snapshots in chronological order
    pub fn window(&self, n: usize) -> impl ExactSizeIterator<Item = &MetricsSnapshot> + '_ {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    pub fn latest(&self) -> Option<&MetricsSnapshot> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &MetricsSnapshot> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
