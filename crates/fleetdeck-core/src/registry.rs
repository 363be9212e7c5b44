use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};

/// Sentinel for a device that has never reported an activity.
pub const NEVER: &str = "Never";

/// Lifecycle state of a registered device. Absence from the registry *is*
/// the offline signal; there is no retained-offline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Online,
}

/// Agent-reported heartbeat payload.
///
/// The protocol between the coordinator and its agents is open: fields are
/// coerced with defaults rather than validated, and unknown shapes collapse
/// to their zero values.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub uptime_hours: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub actions_today: Map<String, Value>,
    pub next_scheduled: Value,
    pub content_version: String,
    pub twitter_logged_in: bool,
}

impl Default for StatusReport {
    fn default() -> Self {
        Self::from_json(&Value::Null)
    }
}

impl StatusReport {
    /// Build a report from arbitrary agent JSON, defaulting every missing or
    /// wrong-typed field.
    pub fn from_json(body: &Value) -> Self {
        Self {
            uptime_hours: body
                .get("uptime_hours")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            cpu_usage: body.get("cpu_usage").and_then(Value::as_f64).unwrap_or(0.0),
            memory_usage: body
                .get("memory_usage")
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            actions_today: body
                .get("actions_today")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            next_scheduled: body.get("next_scheduled").cloned().unwrap_or(Value::Null),
            content_version: body
                .get("content_version")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            twitter_logged_in: body
                .get("twitter_logged_in")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// Current status row for one device. A row exists only between the device's
/// first heartbeat and its staleness eviction.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatus {
    pub status: DeviceState,
    #[serde(with = "time::serde::rfc3339")]
    pub last_seen: OffsetDateTime,
    pub uptime_hours: f64,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub actions_today: Map<String, Value>,
    pub next_scheduled: Value,
    pub content_version: String,
    pub twitter_logged_in: bool,
    pub last_activity: String,
}

/// Maps device identifier to its current status snapshot.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceStatus>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the row for `id`. A heartbeat always means online
    /// and always refreshes `last_seen`, regardless of prior state.
    pub fn record_heartbeat(
        &mut self,
        id: &str,
        report: StatusReport,
        last_activity: String,
        now: OffsetDateTime,
    ) {
        self.devices.insert(
            id.to_string(),
            DeviceStatus {
                status: DeviceState::Online,
                last_seen: now,
                uptime_hours: report.uptime_hours,
                cpu_usage: report.cpu_usage,
                memory_usage: report.memory_usage,
                actions_today: report.actions_today,
                next_scheduled: report.next_scheduled,
                content_version: report.content_version,
                twitter_logged_in: report.twitter_logged_in,
                last_activity,
            },
        );
    }

    /// Refresh `last_activity` after an activity report. No-op for devices
    /// that have not heartbeated yet.
    pub fn touch_activity(&mut self, id: &str, timestamp: &str) {
        if let Some(device) = self.devices.get_mut(id) {
            device.last_activity = timestamp.to_string();
        }
    }

    /// Drop every row whose last heartbeat is strictly older than
    /// `threshold`. Activity history and command queues live elsewhere and
    /// are not touched. Returns the evicted identifiers.
    pub fn evict_stale(&mut self, now: OffsetDateTime, threshold: Duration) -> Vec<String> {
        let mut evicted = Vec::new();
        self.devices.retain(|id, device| {
            if now - device.last_seen > threshold {
                evicted.push(id.clone());
                false
            } else {
                true
            }
        });
        evicted
    }

    pub fn get(&self, id: &str) -> Option<&DeviceStatus> {
        self.devices.get(id)
    }

    pub fn snapshot(&self) -> &HashMap<String, DeviceStatus> {
        &self.devices
    }

    pub fn device_ids(&self) -> Vec<String> {
        self.devices.keys().cloned().collect()
    }

    pub fn online_count(&self) -> usize {
        self.devices
            .values()
            .filter(|d| d.status == DeviceState::Online)
            .count()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
