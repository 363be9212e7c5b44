use std::net::SocketAddr;
use std::time::Duration;

use fleetdeck_server::build_app;
use fleetdeck_server::config::ServerConfig;
use fleetdeck_server::state::AppState;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with default config on an ephemeral port.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// A heartbeat body with the given actions_today counts.
pub fn heartbeat_body(actions: &[(&str, i64)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (action, count) in actions {
        map.insert((*action).to_string(), serde_json::json!(count));
    }
    serde_json::json!({
        "uptime_hours": 1.0,
        "cpu_usage": 12.5,
        "memory_usage": 40.0,
        "actions_today": map,
        "content_version": "v1",
        "twitter_logged_in": true,
    })
}

/// An activity body for the given action name.
pub fn activity_body(action: &str) -> serde_json::Value {
    serde_json::json!({
        "action": action,
        "success": true,
        "content_preview": format!("{action} posted"),
    })
}
