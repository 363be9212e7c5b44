use serde::Deserialize;

/// Top-level server configuration, loaded from `fleetdeck.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Shared key for control operations. Loaded and carried so operators
    /// can configure it ahead of time, but no handler checks it yet.
    /// TODO: enforce on the /api/control routes once the agent fleet ships
    /// header support.
    pub api_key: Option<String>,
    pub fleet: FleetConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            api_key: None,
            fleet: FleetConfig::default(),
        }
    }
}

/// Fleet policy knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Seconds without a heartbeat before a device is evicted from the
    /// registry.
    pub stale_after_secs: u64,
    /// Pending-command depth at which a warning is logged for a device.
    pub queue_depth_alarm: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 600,
            queue_depth_alarm: 50,
        }
    }
}

impl ServerConfig {
    /// Validate configuration, exiting on values the server cannot run with.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }
        if self.fleet.stale_after_secs == 0 {
            tracing::error!("fleet.stale_after_secs must be > 0");
            std::process::exit(1);
        }
        if self.fleet.queue_depth_alarm == 0 {
            tracing::error!("fleet.queue_depth_alarm must be > 0");
            std::process::exit(1);
        }
        if self.api_key.is_none() {
            tracing::warn!("no api_key configured — control endpoints are open");
        }
    }

    /// Load config from `fleetdeck.toml` if it exists, then apply env var
    /// overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("fleetdeck.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from fleetdeck.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse fleetdeck.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No fleetdeck.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("FLEETDECK_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(key) = std::env::var("FLEETDECK_API_KEY")
            && !key.is_empty()
        {
            config.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("FLEETDECK_STALE_AFTER_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.fleet.stale_after_secs = n;
        }
        if let Ok(val) = std::env::var("FLEETDECK_QUEUE_DEPTH_ALARM")
            && let Ok(n) = val.parse::<usize>()
        {
            config.fleet.queue_depth_alarm = n;
        }

        config
    }
}
