use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::FleetError;
use crate::time::format_rfc3339;

/// Most entries retained per device before the oldest are silently dropped.
pub const MAX_ENTRIES_PER_DEVICE: usize = 50;

/// Longest stored content preview, in characters.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// One completed action as stored in the log.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub action: String,
    pub success: bool,
    pub details: String,
    pub content_preview: String,
}

/// Agent-reported completed action, coerced from arbitrary JSON the same way
/// heartbeats are: missing or wrong-typed fields default, nothing rejects.
#[derive(Debug, Clone)]
pub struct ActivityReport {
    pub action: String,
    pub success: bool,
    pub details: String,
    pub content_preview: String,
}

impl ActivityReport {
    pub fn from_json(body: &Value) -> Self {
        Self {
            action: body
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            success: body
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            details: body
                .get("details")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            // Cut once here; the stored preview is never re-validated.
            content_preview: body
                .get("content_preview")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .chars()
                .take(PREVIEW_MAX_CHARS)
                .collect(),
        }
    }

    /// Stamp the report with the ingestion time, producing the stored entry.
    pub fn into_entry(self, now: OffsetDateTime) -> Result<ActivityEntry, FleetError> {
        Ok(ActivityEntry {
            timestamp: format_rfc3339(now)?,
            action: self.action,
            success: self.success,
            details: self.details,
            content_preview: self.content_preview,
        })
    }
}

/// Per-device bounded activity history, most recent first.
///
/// Keyed independently of the registry: history survives staleness eviction
/// and may exist for devices that have never heartbeated.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: HashMap<String, VecDeque<ActivityEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front and drop anything past the cap. Overflow is not
    /// an error.
    pub fn append(&mut self, id: &str, entry: ActivityEntry) {
        let log = self.entries.entry(id.to_string()).or_default();
        log.push_front(entry);
        log.truncate(MAX_ENTRIES_PER_DEVICE);
    }

    /// Timestamp of the newest entry, or None when the device has no history.
    pub fn most_recent_timestamp(&self, id: &str) -> Option<&str> {
        self.entries
            .get(id)
            .and_then(|log| log.front())
            .map(|entry| entry.timestamp.as_str())
    }

    pub fn entries_for(&self, id: &str) -> Option<&VecDeque<ActivityEntry>> {
        self.entries.get(id)
    }

    pub fn snapshot(&self) -> &HashMap<String, VecDeque<ActivityEntry>> {
        &self.entries
    }
}
