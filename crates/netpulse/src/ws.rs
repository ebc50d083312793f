// ── WebSocket observers ──
//
// One hub observer per socket. Outbound frames are forwarded verbatim;
// inbound messages are ignored apart from close.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use netpulse_core::Monitor;

use crate::http::AppState;

pub async fn upgrade(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        handle_socket(socket, &app.monitor, &app.shutdown).await;
    })
}

async fn handle_socket(socket: WebSocket, monitor: &Monitor, shutdown: &CancellationToken) {
    let mut observer = match monitor.join() {
        Ok(observer) => observer,
        Err(e) => {
            warn!(error = %e, "could not register observer");
            return;
        }
    };
    let id = observer.id();
    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = observer.recv().await {
            if sink.send(Message::Text(frame.as_str().to_owned().into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
        () = shutdown.cancelled() => {
            send_task.abort();
            recv_task.abort();
        }
    }

    monitor.leave(id);
    debug!(observer = %id, "websocket closed");
}
