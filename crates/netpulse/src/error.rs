//! Server error types with miette diagnostics.
//!
//! Startup failures end the process with an exit code; nothing raised
//! after the listener is up is fatal.

use std::net::SocketAddr;

use miette::Diagnostic;
use thiserror::Error;

use netpulse_config::ConfigError;
use netpulse_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 3;
    pub const BIND: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(netpulse::config),
        help(
            "Run `netpulse config show` to inspect the effective configuration.\n\
             Environment overrides use the NETPULSE_ prefix, e.g. NETPULSE_SERVER__PORT=6000."
        )
    )]
    Config(#[from] ConfigError),

    // ── Listener ─────────────────────────────────────────────────────
    #[error("No available port in {first}..{last}")]
    #[diagnostic(
        code(netpulse::no_available_port),
        help("Free one of these ports, or pick another range with --port / --port-attempts.")
    )]
    NoAvailablePort { first: u16, last: u16 },

    #[error("Could not bind {addr}")]
    #[diagnostic(code(netpulse::bind_failed), help("Check --bind and that the address is local."))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    // ── Runtime ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(netpulse::core))]
    Core(#[from] CoreError),

    #[error(transparent)]
    #[diagnostic(code(netpulse::io))]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => exit_code::CONFIG,
            Self::NoAvailablePort { .. } | Self::Bind { .. } => exit_code::BIND,
            Self::Core(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}
