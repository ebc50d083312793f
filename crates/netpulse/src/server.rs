// ── Listener lifecycle ──
//
// Binds with port fallback, starts the monitor, serves until a shutdown
// signal, then stops observers and background tasks.

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use netpulse_config::{Config, ServerConfig};
use netpulse_core::{Monitor, SysinfoSource};

use crate::error::ServerError;
use crate::http::{self, AppState};

/// Pause between bind attempts on successive ports.
const RETRY_DELAY: Duration = Duration::from_millis(200);

pub async fn serve(config: &Config) -> Result<(), ServerError> {
    let monitor = Monitor::new(config.to_monitor_config()?, Arc::new(SysinfoSource::new()));

    let listener = bind_with_fallback(&config.server).await?;
    let addr = listener.local_addr()?;
    if let Some(ref path) = config.server.port_file {
        if let Err(e) = write_port_file(path, addr.port()) {
            warn!(path = %path.display(), error = %e, "failed to write port file");
        }
    }

    monitor.start().await?;

    let shutdown = CancellationToken::new();
    let app = http::router(AppState {
        monitor: monitor.clone(),
        port: addr.port(),
        shutdown: shutdown.clone(),
    });

    info!(%addr, "listening (HTTP on /api, WebSocket on /ws)");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_signal().await;
            info!("shutdown requested");
            shutdown.cancel();
        })
        .await?;

    monitor.shutdown().await;
    Ok(())
}

/// Bind the first free port among `server.candidate_addrs()`.
///
/// Only "address in use" moves on to the next port; any other bind error
/// is returned immediately.
pub async fn bind_with_fallback(server: &ServerConfig) -> Result<TcpListener, ServerError> {
    let mut last_port = server.port;

    for (attempt, addr) in server.candidate_addrs().enumerate() {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY).await;
        }
        last_port = addr.port();

        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                warn!(%addr, "port in use, trying next");
            }
            Err(source) => return Err(ServerError::Bind { addr, source }),
        }
    }

    Err(ServerError::NoAvailablePort {
        first: server.port,
        last: last_port,
    })
}

pub fn write_port_file(path: &Path, port: u16) -> io::Result<()> {
    std::fs::write(path, port.to_string())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
