//! Client configuration: connection target, join mode and reconnect policy.
//! Loaded from TOML at startup; CLI flags override individual fields.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::client::error::ClientError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 13050;

/// Settings for one client process.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Reservation code; takes precedence over `room_id`.
    pub reservation: Option<String>,
    pub room_id: Option<String>,
    /// Reconnect after the server leaves the room.
    pub auto_reconnect: bool,
    /// Keep running after the server leaves, until stopped manually.
    pub survive: bool,
    pub reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
    /// Transport read timeout; 0 blocks indefinitely.
    pub read_timeout_ms: u64,
    /// Finished games kept in the session history.
    pub history_retention: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            reservation: None,
            room_id: None,
            auto_reconnect: false,
            survive: false,
            reconnect_attempts: 3,
            reconnect_delay_ms: 1000,
            read_timeout_ms: 500,
            history_retention: 8,
        }
    }
}

/// How the client enters a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinMode {
    Reservation(String),
    Room(String),
    Fresh,
}

impl ClientConfig {
    /// Reservation first, then room id, then a plain join. Blank values count as unset.
    pub fn join_mode(&self) -> JoinMode {
        let non_blank = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
        if let Some(code) = non_blank(&self.reservation) {
            JoinMode::Reservation(code)
        } else if let Some(room) = non_blank(&self.room_id) {
            JoinMode::Room(room)
        } else {
            JoinMode::Fresh
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }
}

/// Load a configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<ClientConfig, ClientError> {
    let content = std::fs::read_to_string(path).map_err(|e| config_error("read", path, e))?;
    toml::from_str(&content).map_err(|e| config_error("parse", path, e))
}

fn config_error(action: &str, path: &Path, error: impl std::fmt::Display) -> ClientError {
    ClientError::Config(format!("failed to {action} {}: {error}", path.display()))
}

/// Try well-known paths, falling back to defaults if none is found.
pub fn load_default_config() -> ClientConfig {
    let candidates = [
        "penguins_client.toml",
        "../penguins_client.toml",
        "/etc/penguins/client.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded client config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load client config");
                }
            }
        }
    }
    tracing::info!("no penguins_client.toml found, using built-in defaults");
    ClientConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_join_precedence() {
        let mut config = ClientConfig::default();
        assert_eq!(config.join_mode(), JoinMode::Fresh);

        config.room_id = Some("room-7".into());
        assert_eq!(config.join_mode(), JoinMode::Room("room-7".into()));

        config.reservation = Some("res-1".into());
        assert_eq!(config.join_mode(), JoinMode::Reservation("res-1".into()));

        config.reservation = Some("  ".into());
        assert_eq!(config.join_mode(), JoinMode::Room("room-7".into()));
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let toml = "port = 4000\nauto_reconnect = true\nreservation = \"abc\"";
        writeln!(file, "{toml}").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.port, 4000);
        assert!(config.auto_reconnect);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.reconnect_attempts, 3);
        assert_eq!(config.join_mode(), JoinMode::Reservation("abc".into()));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
assert!(matches!(
            load_config(file.path()),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            load_config(Path::new("/nonexistent/penguins.toml")),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_durations() {
        let mut config = ClientConfig::default();
        assert_eq!(config.reconnect_delay(), Duration::from_secs(1));
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(500)));
        config.read_timeout_ms = 0;
        assert_eq!(config.read_timeout(), None);
    }
}
