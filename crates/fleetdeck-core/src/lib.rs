pub mod activity;
pub mod analytics;
pub mod command;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use serde_json::json;

    use crate::activity::ActivityReport;
    use crate::registry::StatusReport;

    /// Heartbeat report carrying the given `actions_today` counts.
    pub fn report_with_actions(counts: &[(&str, i64)]) -> StatusReport {
        let mut actions = serde_json::Map::new();
        for (kind, count) in counts {
            actions.insert((*kind).to_string(), json!(count));
        }
        StatusReport {
            uptime_hours: 1.0,
            cpu_usage: 12.5,
            actions_today: actions,
            ..StatusReport::default()
        }
    }

    /// Activity report for a successfully completed action.
    pub fn activity_report(action: &str) -> ActivityReport {
        ActivityReport::from_json(&json!({
            "action": action,
            "success": true,
            "details": "done",
        }))
    }
}
