//! Bounded log of validation attempts.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

/// Log capacity; the oldest entry is evicted when exceeded.
pub const MAX_LOG_ENTRIES: usize = 100;

/// One validation attempt, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationLogEntry {
    pub timestamp: DateTime<Utc>,
    pub code: String,
    pub success: bool,
    pub error: Option<String>,
    pub identifier: String,
}

/// Ring buffer of validation attempts, newest first.
pub struct ValidationLog {
    entries: Mutex<VecDeque<ValidationLogEntry>>,
    capacity: usize,
}

impl ValidationLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Appends an attempt at the front, evicting the oldest when full.
    pub fn record(&self, entry: ValidationLogEntry) {
        if entry.success {
            info!(code = %entry.code, identifier = %entry.identifier, "Validation attempt succeeded");
        } else {
            warn!(
                code = %entry.code,
                identifier = %entry.identifier,
                error = entry.error.as_deref().unwrap_or(""),
                "Validation attempt failed"
            );
        }

        let mut entries = self.entries.lock();
        entries.push_front(entry);
        if entries.len() > self.capacity {
            entries.pop_back();
        }
    }

    /// Defensive copy of the log, newest entry at index 0.
    pub fn snapshot(&self) -> Vec<ValidationLogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ValidationLog {
    fn default() -> Self {
        Self::new()
    }
}
