//! Configuration for the netpulse server.
//!
//! Layered loading (built-in defaults, TOML file, `NETPULSE_` environment)
//! and translation to `netpulse_core::MonitorConfig`. The core never reads
//! configuration itself; the binary loads a [`Config`] here, applies its
//! CLI overrides and hands the result in.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netpulse_core::{HealthThresholds, InterfaceFilter, MonitorConfig, RetentionConfig};

/// Prefix for environment overrides; nested keys are separated by `__`,
/// e.g. `NETPULSE_SERVER__PORT=6000`.
pub const ENV_PREFIX: &str = "NETPULSE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub monitor: MonitorSection,
}

/// Where and how the HTTP/WebSocket listener binds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: IpAddr,

    /// First port tried.
    pub port: u16,

    /// Successive ports tried when the preferred one is taken.
    pub port_attempts: u16,

    /// File the bound port is written to once listening.
    pub port_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5001,
            port_attempts: 10,
            port_file: None,
        }
    }
}

impl ServerConfig {
    /// Addresses to try in order: `port`, `port + 1`, ... up to
    /// `port_attempts` candidates, never past `u16::MAX`.
    pub fn candidate_addrs(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        (0..self.port_attempts)
            .map_while(|offset| self.port.checked_add(offset))
            .map(|port| SocketAddr::new(self.bind, port))
    }
}

/// Monitor settings in file form. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MonitorSection {
    pub sample_interval_ms: u64,
    pub broadcast_interval_ms: u64,
    pub observer_queue_depth: usize,
    pub retention: RetentionConfig,
    pub thresholds: HealthThresholds,
    pub interfaces: InterfaceFilter,
}

impl Default for MonitorSection {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            sample_interval_ms: millis(defaults.sample_interval),
            broadcast_interval_ms: millis(defaults.broadcast_interval),
            observer_queue_depth: defaults.observer_queue_depth,
            retention: defaults.retention,
            thresholds: defaults.thresholds,
            interfaces: defaults.interfaces,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "netpulse", "netpulse").map_or_else(
        || PathBuf::from("netpulse.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Build the layered provider chain without extracting it.
///
/// A bare `PORT` variable sets `server.port`; `NETPULSE_SERVER__PORT`
/// still wins over it.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config.
///
/// With `Some(path)` the file must exist. With `None` the platform config
/// path is used if present and silently skipped otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(explicit) => {
            if !explicit.is_file() {
                return Err(ConfigError::NotFound {
                    path: explicit.to_path_buf(),
                });
            }
            explicit.to_path_buf()
        }
        None => config_path(),
    };

    let config: Config = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Translation & validation ────────────────────────────────────────

impl Config {
    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let monitor = &self.monitor;
        check(
            monitor.sample_interval_ms > 0,
            "monitor.sample_interval_ms",
            "must be greater than 0",
        )?;
        check(
            monitor.broadcast_interval_ms > 0,
            "monitor.broadcast_interval_ms",
            "must be greater than 0",
        )?;
        check(
            monitor.observer_queue_depth > 0,
            "monitor.observer_queue_depth",
            "must be at least 1",
        )?;
        check(monitor.retention.alerts > 0, "monitor.retention.alerts", "must be at least 1")?;
        check(monitor.retention.logs > 0, "monitor.retention.logs", "must be at least 1")?;
        check(
            monitor.thresholds.traffic_bytes_per_sec.is_finite()
                && monitor.thresholds.traffic_bytes_per_sec >= 0.0,
            "monitor.thresholds.traffic_bytes_per_sec",
            "must be a non-negative number",
        )?;
        check(self.server.port_attempts > 0, "server.port_attempts", "must be at least 1")?;
        Ok(())
    }

    /// Build the runtime monitor configuration.
    pub fn to_monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        self.validate()?;
        let monitor = &self.monitor;
        Ok(MonitorConfig {
            sample_interval: Duration::from_millis(monitor.sample_interval_ms),
            broadcast_interval: Duration::from_millis(monitor.broadcast_interval_ms),
            retention: monitor.retention,
            thresholds: monitor.thresholds,
            interfaces: monitor.interfaces.clone(),
            observer_queue_depth: monitor.observer_queue_depth,
        })
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn check(ok: bool, field: &str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netpulse.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.server.port_attempts, 10);
        assert_eq!(config.monitor.sample_interval_ms, 1000);
        assert_eq!(config.monitor.broadcast_interval_ms, 1000);
        assert_eq!(config.monitor.retention.alerts, 20);
        assert_eq!(config.monitor.retention.logs, 50);
        assert_eq!(config.monitor.thresholds.error_log_limit, 10);
        assert_eq!(config.monitor.thresholds.critical_alert_limit, 0);
        assert_eq!(config.monitor.thresholds.traffic_bytes_per_sec, 10_485_760.0);
        assert!(config.monitor.interfaces.exclude_loopback);
        assert_eq!(config.monitor.observer_queue_depth, 64);
    }

    #[test]
    fn file_values_override_defaults_partially() {
        let (_dir, path) = write_config(
            r#"
            [server]
            port = 7000

            [monitor]
            sample_interval_ms = 250

            [monitor.retention]
            alerts = 5

            [monitor.interfaces]
            exclude = ["docker0"]
            "#,
        );

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.port_attempts, 10);
        assert_eq!(config.monitor.sample_interval_ms, 250);
        assert_eq!(config.monitor.broadcast_interval_ms, 1000);
        assert_eq!(config.monitor.retention.alerts, 5);
        assert_eq!(config.monitor.retention.logs, 50);
        assert_eq!(config.monitor.interfaces.exclude, vec!["docker0".to_owned()]);
        assert!(config.monitor.interfaces.exclude_loopback);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let (_dir, path) = write_config("[monitor]\nbroadcast_interval_ms = 0\n");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref field, .. } if field == "monitor.broadcast_interval_ms"
        ));
    }

    #[test]
    fn malformed_values_surface_figment_errors() {
        let (_dir, path) = write_config("[server]\nport = \"not a port\"\n");
        assert!(matches!(
            load_config(Some(&path)).unwrap_err(),
            ConfigError::Figment(_)
        ));
    }

    #[test]
    fn monitor_config_translation() {
        let mut config = Config::default();
        config.monitor.sample_interval_ms = 500;
        config.monitor.thresholds.error_log_limit = 3;

        let monitor = config.to_monitor_config().unwrap();
        assert_eq!(monitor.sample_interval, Duration::from_millis(500));
        assert_eq!(monitor.broadcast_interval, Duration::from_secs(1));
        assert_eq!(monitor.thresholds.error_log_limit, 3);
        assert_eq!(monitor.observer_queue_depth, 64);
    }

    #[test]
    fn rendered_toml_loads_back_unchanged() {
        let mut config = Config::default();
        config.server.port_file = Some(PathBuf::from(".backend-port"));
        config.monitor.interfaces.include = vec!["eth0".into()];

        let (_dir, path) = write_config(&config.to_toml().unwrap());
        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn candidate_ports_stop_at_u16_max() {
        let server = ServerConfig {
            port: u16::MAX - 1,
            port_attempts: 10,
            ..ServerConfig::default()
        };
        let ports: Vec<u16> = server.candidate_addrs().map(|a| a.port()).collect();
        assert_eq!(ports, vec![u16::MAX - 1, u16::MAX]);

        let default_ports: Vec<u16> = ServerConfig::default()
            .candidate_addrs()
            .map(|a| a.port())
            .collect();
        assert_eq!(default_ports.first(), Some(&5001));
        assert_eq!(default_ports.len(), 10);
    }
}
