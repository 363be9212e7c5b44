use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::FleetError;
use crate::time::format_rfc3339;

/// An operator command queued for one device.
///
/// Ownership transfers to the device on drain; delivery is fire-and-forget
/// with no acknowledgment and no retry.
#[derive(Debug, Clone, Serialize)]
pub struct Command {
    pub command_id: String,
    pub action: String,
    pub parameters: Map<String, Value>,
    pub timestamp: String,
}

impl Command {
    /// Ids keep a readable action prefix; the random suffix keeps commands
    /// of the same kind distinct even when issued within the same second.
    pub fn new(
        action: &str,
        parameters: Map<String, Value>,
        now: OffsetDateTime,
    ) -> Result<Self, FleetError> {
        Ok(Self {
            command_id: format!("{action}_{}", Uuid::new_v4().simple()),
            action: action.to_string(),
            parameters,
            timestamp: format_rfc3339(now)?,
        })
    }
}

/// Per-device FIFO of not-yet-delivered commands.
///
/// Queues are keyed independently of the registry, so commands can be
/// pre-queued for a device that has never heartbeated.
#[derive(Debug, Default)]
pub struct CommandQueue {
    queues: HashMap<String, Vec<Command>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail of `id`'s queue, creating it if absent. The queue
    /// is unbounded; the returned depth lets callers alarm on growth.
    pub fn enqueue(&mut self, id: &str, command: Command) -> usize {
        let queue = self.queues.entry(id.to_string()).or_default();
        queue.push(command);
        queue.len()
    }

    /// Read-and-clear: the entire queue is handed over and forgotten.
    /// Unknown devices drain to an empty list.
    pub fn drain(&mut self, id: &str) -> Vec<Command> {
        self.queues.remove(id).unwrap_or_default()
    }

    pub fn depth(&self, id: &str) -> usize {
        self.queues.get(id).map_or(0, Vec::len)
    }
}
