use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::registry::{DeviceState, DeviceStatus};

/// Full analytics aggregation over a registry snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct FleetAnalytics {
    pub fleet_overview: FleetOverview,
    pub action_breakdown: ActionBreakdown,
    pub device_details: Vec<DeviceDetail>,
    pub performance_metrics: PerformanceMetrics,
    pub top_performers: Vec<DeviceDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetOverview {
    pub total_devices: usize,
    pub online_devices: usize,
    pub offline_devices: usize,
    pub total_uptime_hours: f64,
    pub average_uptime_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionBreakdown {
    pub total_actions: i64,
    pub tweets: i64,
    pub replies: i64,
    pub retweets: i64,
    pub tweet_percentage: f64,
    pub reply_percentage: f64,
    pub retweet_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    pub id: String,
    pub name: String,
    pub status: DeviceState,
    pub uptime_hours: f64,
    pub actions_today: Map<String, Value>,
    pub total_actions: i64,
    pub last_activity: String,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub avg_actions_per_device: f64,
    pub uptime_percentage: f64,
    pub action_efficiency: f64,
    pub device_health_score: f64,
}

/// Agent-reported counts are untrusted; anything non-numeric counts as 0.
fn count(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}

/// 0 when the denominator is 0: an empty fleet is a defined case, not an
/// error.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn total_actions_for(device: &DeviceStatus) -> i64 {
    device.actions_today.values().map(count).sum()
}

/// Derive the read-only analytics view. The caller is responsible for
/// evicting stale devices first.
pub fn compute(devices: &HashMap<String, DeviceStatus>) -> FleetAnalytics {
    let total_devices = devices.len();
    let online_devices = devices
        .values()
        .filter(|d| d.status == DeviceState::Online)
        .count();

    let mut total_actions = 0i64;
    let mut tweets = 0i64;
    let mut replies = 0i64;
    let mut retweets = 0i64;
    let mut total_uptime = 0.0f64;

    for device in devices.values() {
        tweets += device.actions_today.get("tweets").map_or(0, count);
        replies += device.actions_today.get("replies").map_or(0, count);
        retweets += device.actions_today.get("retweets").map_or(0, count);
        total_actions += total_actions_for(device);
        total_uptime += device.uptime_hours;
    }

    let mut device_details: Vec<DeviceDetail> = devices
        .iter()
        .map(|(id, device)| DeviceDetail {
            id: id.clone(),
            name: id.replace("bot_", ""),
            status: device.status,
            uptime_hours: device.uptime_hours,
            actions_today: device.actions_today.clone(),
            total_actions: total_actions_for(device),
            last_activity: device.last_activity.clone(),
            cpu_usage: device.cpu_usage,
            memory_usage: device.memory_usage,
        })
        .collect();
    device_details.sort_by(|a, b| b.total_actions.cmp(&a.total_actions));

    let top_performers: Vec<DeviceDetail> = device_details.iter().take(3).cloned().collect();

    FleetAnalytics {
        fleet_overview: FleetOverview {
            total_devices,
            online_devices,
            offline_devices: total_devices - online_devices,
            total_uptime_hours: total_uptime,
            average_uptime_hours: ratio(total_uptime, total_devices as f64),
        },
        action_breakdown: ActionBreakdown {
            total_actions,
            tweets,
            replies,
            retweets,
            tweet_percentage: ratio(tweets as f64, total_actions as f64) * 100.0,
            reply_percentage: ratio(replies as f64, total_actions as f64) * 100.0,
            retweet_percentage: ratio(retweets as f64, total_actions as f64) * 100.0,
        },
        device_details,
        performance_metrics: PerformanceMetrics {
            avg_actions_per_device: ratio(total_actions as f64, total_devices as f64),
            uptime_percentage: ratio(online_devices as f64, total_devices as f64) * 100.0,
            action_efficiency: ratio(total_actions as f64, total_uptime),
            device_health_score: ratio(online_devices as f64, total_devices as f64) * 100.0,
        },
        top_performers,
    }
}
