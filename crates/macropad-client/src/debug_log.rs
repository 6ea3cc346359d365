//! Bounded log of raw exchanged payloads

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Which way a payload travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDirection {
    /// Host to device
    Sent,
    /// Device to host
    Received,
}

impl std::fmt::Display for LogDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogDirection::Sent => f.write_str("sent"),
            LogDirection::Received => f.write_str("received"),
        }
    }
}

/// One logged payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugEntry {
    /// When the payload was logged
    pub timestamp: DateTime<Utc>,
    /// Direction
    pub direction: LogDirection,
    /// Payload as text, lossily decoded
    pub data: String,
}

/// Most-recent-first ring of payloads, shared between clones
#[derive(Debug, Clone)]
pub struct DebugLog {
    entries: Arc<Mutex<VecDeque<DebugEntry>>>,
    capacity: usize,
}

impl DebugLog {
    /// Create a log holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Record a payload, evicting the oldest entry when full
    pub fn record(&self, direction: LogDirection, payload: &[u8]) {
        let entry = DebugEntry {
            timestamp: Utc::now(),
            direction,
            data: String::from_utf8_lossy(payload).into_owned(),
        };
        let mut entries = self.entries.lock();
        entries.push_front(entry);
        entries.truncate(self.capacity);
    }

    /// Snapshot, newest first
    pub fn entries(&self) -> Vec<DebugEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Number of entries held
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Maximum entries held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
