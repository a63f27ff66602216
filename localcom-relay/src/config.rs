use anyhow::{Result, bail};
use localcom_core::utils::DEFAULT_WS_PATH;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

/// Relay settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,

    /// The only path on which WebSocket upgrades are accepted.
    pub ws_path: String,

    /// Outbound frames buffered per connection before new ones are dropped
    /// for that connection.
    pub peer_queue: usize,

    /// Longest a single frame write may take before the connection is closed.
    pub send_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            ws_path: DEFAULT_WS_PATH.to_owned(),
            peer_queue: 64,
            send_timeout: Duration::from_secs(5),
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `PORT`, `LOCALCOM_WS_PATH`, `LOCALCOM_PEER_QUEUE`
    /// and `LOCALCOM_SEND_TIMEOUT_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = env_parse::<u16>("PORT") {
            config.bind.set_port(port);
        }

        if let Ok(path) = std::env::var("LOCALCOM_WS_PATH") {
            config.ws_path = path;
        }

        if let Some(queue) = env_parse::<usize>("LOCALCOM_PEER_QUEUE") {
            config.peer_queue = queue;
        }

        if let Some(ms) = env_parse::<u64>("LOCALCOM_SEND_TIMEOUT_MS") {
            config.send_timeout = Duration::from_millis(ms);
        }

        config
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_ws_path(mut self, path: impl Into<String>) -> Self {
        self.ws_path = path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.ws_path.starts_with('/') {
            bail!("ws_path must start with '/', got {:?}", self.ws_path);
        }

        if self.peer_queue == 0 {
            bail!("peer_queue must be > 0");
        }

        if self.send_timeout.is_zero() {
            bail!("send_timeout must be > 0");
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}
