use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};

use crate::activity::{ActivityEntry, ActivityLog, ActivityReport};
use crate::analytics::{self, FleetAnalytics};
use crate::command::{Command, CommandQueue};
use crate::error::FleetError;
use crate::registry::{DeviceRegistry, DeviceStatus, NEVER, StatusReport};

/// Read-only view of the whole fleet, produced after a staleness sweep.
#[derive(Debug, Clone, Serialize)]
pub struct FleetStatus {
    pub devices: HashMap<String, DeviceStatus>,
    pub recent_activities: HashMap<String, VecDeque<ActivityEntry>>,
    pub total_devices: usize,
    pub online_devices: usize,
}

/// Orchestrates the device registry, activity log, and command queues.
///
/// Constructed once at startup and shared behind a lock by the transport
/// layer. Every operation is bounded, synchronous, in-memory work; there is
/// no I/O wait anywhere below this point.
#[derive(Debug)]
pub struct FleetCoordinator {
    registry: DeviceRegistry,
    activity: ActivityLog,
    commands: CommandQueue,
    stale_after: Duration,
}

impl FleetCoordinator {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            activity: ActivityLog::new(),
            commands: CommandQueue::new(),
            stale_after,
        }
    }

    /// Ingest a heartbeat. The status row is rebuilt from the report;
    /// `last_activity` comes from the activity log, never from the agent.
    pub fn record_heartbeat(&mut self, id: &str, report: StatusReport, now: OffsetDateTime) {
        let last_activity = self
            .activity
            .most_recent_timestamp(id)
            .map_or_else(|| NEVER.to_string(), str::to_string);
        self.registry.record_heartbeat(id, report, last_activity, now);
    }

    /// Ingest a completed action and refresh the device's last-activity
    /// stamp if the device is currently registered.
    pub fn record_activity(
        &mut self,
        id: &str,
        report: ActivityReport,
        now: OffsetDateTime,
    ) -> Result<ActivityEntry, FleetError> {
        let entry = report.into_entry(now)?;
        self.registry.touch_activity(id, &entry.timestamp);
        self.activity.append(id, entry.clone());
        Ok(entry)
    }

    /// Hand the device its entire pending queue. At-most-once: whatever the
    /// device fails to receive is gone.
    pub fn drain_commands(&mut self, id: &str) -> Vec<Command> {
        self.commands.drain(id)
    }

    /// Queue a command for one device, registered or not. Returns the
    /// command and the resulting queue depth.
    pub fn enqueue_command(
        &mut self,
        id: &str,
        action: &str,
        parameters: Map<String, Value>,
        now: OffsetDateTime,
    ) -> Result<(Command, usize), FleetError> {
        let command = Command::new(action, parameters, now)?;
        let depth = self.commands.enqueue(id, command.clone());
        Ok((command, depth))
    }

    /// Fan a command out to every device in the registry snapshot taken
    /// now. Devices that register afterwards are not targeted. Returns the
    /// targeted identifiers.
    pub fn broadcast(
        &mut self,
        action: &str,
        parameters: Map<String, Value>,
        now: OffsetDateTime,
    ) -> Result<Vec<String>, FleetError> {
        let targets = self.registry.device_ids();
        for id in &targets {
            let command = Command::new(action, parameters.clone(), now)?;
            self.commands.enqueue(id, command);
        }
        Ok(targets)
    }

    /// Drop devices quiet for longer than the staleness threshold. Their
    /// history and queued commands survive.
    pub fn evict_stale(&mut self, now: OffsetDateTime) -> Vec<String> {
        self.registry.evict_stale(now, self.stale_after)
    }

    /// Snapshot the fleet. Staleness is computed lazily: every aggregate
    /// read evicts first.
    pub fn fleet_status(&mut self, now: OffsetDateTime) -> FleetStatus {
        self.evict_stale(now);
        FleetStatus {
            devices: self.registry.snapshot().clone(),
            recent_activities: self.activity.snapshot().clone(),
            total_devices: self.registry.len(),
            online_devices: self.registry.online_count(),
        }
    }

    /// Aggregate analytics over the post-eviction registry.
    pub fn analytics(&mut self, now: OffsetDateTime) -> FleetAnalytics {
        self.evict_stale(now);
        analytics::compute(self.registry.snapshot())
    }

    pub fn device(&self, id: &str) -> Option<&DeviceStatus> {
        self.registry.get(id)
    }

    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    pub fn queue_depth(&self, id: &str) -> usize {
        self.commands.depth(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{activity_report, report_with_actions};
    use time::macros::datetime;

    const T0: OffsetDateTime = datetime!(2026-01-01 00:00:00 UTC);
    const TEN_MINUTES: Duration = Duration::minutes(10);

    fn coordinator() -> FleetCoordinator {
        FleetCoordinator::new(TEN_MINUTES)
    }

    #[test]
    fn heartbeat_appears_in_fleet_status() {
        let mut fleet = coordinator();
        fleet.record_heartbeat("bot_a", report_with_actions(&[("tweets", 2)]), T0);

        let status = fleet.fleet_status(T0);
        assert_eq!(status.total_devices, 1);
        assert_eq!(status.online_devices, 1);
        let device = &status.devices["bot_a"];
        assert!(device.last_seen >= T0);
        assert_eq!(device.last_activity, NEVER);
    }

    #[test]
    fn activity_feeds_last_activity_on_next_heartbeat() {
        let mut fleet = coordinator();
        fleet.record_heartbeat("bot_a", StatusReport::default(), T0);

        let entry = fleet
            .record_activity("bot_a", activity_report("tweet"), T0 + Duration::seconds(30))
            .unwrap();
        // The live row is touched immediately.
        assert_eq!(fleet.device("bot_a").unwrap().last_activity, entry.timestamp);

        // And the next heartbeat recomputes it from the log.
        fleet.record_heartbeat("bot_a", StatusReport::default(), T0 + Duration::minutes(1));
        assert_eq!(fleet.device("bot_a").unwrap().last_activity, entry.timestamp);
    }

    #[test]
    fn activity_for_unregistered_device_is_kept() {
        let mut fleet = coordinator();
        fleet
            .record_activity("bot_ghost", activity_report("tweet"), T0)
            .unwrap();

        assert!(fleet.device("bot_ghost").is_none());
        let status = fleet.fleet_status(T0);
        assert_eq!(status.recent_activities["bot_ghost"].len(), 1);
    }

    #[test]
    fn drain_twice_yields_then_empties() {
        let mut fleet = coordinator();
        fleet
            .enqueue_command("bot_a", "stop_bot", Map::new(), T0)
            .unwrap();

        assert_eq!(fleet.drain_commands("bot_a").len(), 1);
        assert!(fleet.drain_commands("bot_a").is_empty());
    }

    #[test]
    fn commands_can_be_pre_queued() {
        let mut fleet = coordinator();
        let (command, depth) = fleet
            .enqueue_command("bot_new", "restart_bot", Map::new(), T0)
            .unwrap();

        assert!(fleet.device("bot_new").is_none());
        assert_eq!(depth, 1);
        assert_eq!(fleet.drain_commands("bot_new")[0].command_id, command.command_id);
    }

    #[test]
    fn broadcast_targets_snapshot_with_distinct_ids() {
        let mut fleet = coordinator();
        for id in ["bot_a", "bot_b", "bot_c"] {
            fleet.record_heartbeat(id, StatusReport::default(), T0);
        }

        let mut params = Map::new();
        params.insert("priority".to_string(), serde_json::json!("critical"));
        let mut targets = fleet.broadcast("emergency_stop", params, T0).unwrap();
        targets.sort();
        assert_eq!(targets, vec!["bot_a", "bot_b", "bot_c"]);

        let mut seen_ids = Vec::new();
        for id in &targets {
            let drained = fleet.drain_commands(id);
            assert_eq!(drained.len(), 1);
            assert_eq!(drained[0].action, "emergency_stop");
            seen_ids.push(drained[0].command_id.clone());
        }
        seen_ids.sort();
        seen_ids.dedup();
        assert_eq!(seen_ids.len(), 3, "broadcast ids must be distinct");

        // A device registered after the broadcast gets nothing.
        fleet.record_heartbeat("bot_d", StatusReport::default(), T0);
        assert!(fleet.drain_commands("bot_d").is_empty());
    }

    #[test]
    fn eviction_spares_history_and_queue() {
        let mut fleet = coordinator();
        fleet.record_heartbeat("bot_a", StatusReport::default(), T0);
        fleet
            .record_activity("bot_a", activity_report("tweet"), T0)
            .unwrap();
        fleet
            .enqueue_command("bot_a", "stop_bot", Map::new(), T0)
            .unwrap();

        let now = T0 + Duration::minutes(11);
        let evicted = fleet.evict_stale(now);
        assert_eq!(evicted, vec!["bot_a"]);
        assert!(fleet.device("bot_a").is_none());

        // The status row is gone but nothing else is.
        assert_eq!(fleet.queue_depth("bot_a"), 1);
        let status = fleet.fleet_status(now);
        assert_eq!(status.total_devices, 0);
        assert_eq!(status.recent_activities["bot_a"].len(), 1);
    }

    #[test]
    fn aggregate_reads_evict_lazily() {
        let mut fleet = coordinator();
        fleet.record_heartbeat("bot_old", StatusReport::default(), T0);
        fleet.record_heartbeat("bot_new", StatusReport::default(), T0 + TEN_MINUTES);

        let status = fleet.fleet_status(T0 + TEN_MINUTES + Duration::minutes(1));
        assert_eq!(status.total_devices, 1);
        assert!(status.devices.contains_key("bot_new"));

        let analytics = fleet.analytics(T0 + TEN_MINUTES + Duration::minutes(1));
        assert_eq!(analytics.fleet_overview.total_devices, 1);
    }

    #[test]
    fn re_heartbeat_revives_evicted_device() {
        let mut fleet = coordinator();
        fleet.record_heartbeat("bot_a", StatusReport::default(), T0);
        fleet.evict_stale(T0 + Duration::minutes(20));
        assert_eq!(fleet.device_count(), 0);

        fleet.record_heartbeat("bot_a", StatusReport::default(), T0 + Duration::minutes(21));
        assert_eq!(fleet.device_count(), 1);
    }
}
