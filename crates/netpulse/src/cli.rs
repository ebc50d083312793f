//! Clap derive structures for the `netpulse` binary.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use netpulse_config::Config;

// ── Top-Level CLI ────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "netpulse",
    version,
    about = "Real-time network telemetry and alert broadcast server",
    long_about = "Samples host network counters, tracks alerts and logs in memory,\n\
        and streams updates to WebSocket observers.\n\n\
        Runs the server when no subcommand is given.",
    propagate_version = true
)]
pub struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(long, short = 'c', env = "NETPULSE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP and WebSocket server (default)
    Serve(ServeArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

// ── serve ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// First port to try
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// How many successive ports to try when one is taken
    #[arg(long)]
    pub port_attempts: Option<u16>,

    /// Write the bound port to this file once listening
    #[arg(long)]
    pub port_file: Option<PathBuf>,

    /// Counter sampling interval in milliseconds
    #[arg(long)]
    pub sample_interval_ms: Option<u64>,

    /// Observer broadcast interval in milliseconds
    #[arg(long)]
    pub broadcast_interval_ms: Option<u64>,
}

impl ServeArgs {
    /// Layer flag values over the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(attempts) = self.port_attempts {
            config.server.port_attempts = attempts;
        }
        if let Some(ref path) = self.port_file {
            config.server.port_file = Some(path.clone());
        }
        if let Some(ms) = self.sample_interval_ms {
            config.monitor.sample_interval_ms = ms;
        }
        if let Some(ms) = self.broadcast_interval_ms {
            config.monitor.broadcast_interval_ms = ms;
        }
    }
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default config file location
    Path,
}
