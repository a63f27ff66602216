use crate::RelayService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use localcom_core::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    let conn_id = ConnectionId::new();

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(service.config().peer_queue);

    let total = service.registry().insert(conn_id, tx);
    info!("Client {} connected. Total clients: {}", conn_id, total);

    let send_timeout = service.config().send_timeout;
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match tokio::time::timeout(send_timeout, sender.send(msg)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!("Write to {} failed: {}", conn_id, e);
                    break;
                }
                Err(_) => {
                    warn!("Write to {} stalled for {:?}, closing", conn_id, send_timeout);
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(frame) = receiver.next().await {
                let msg = match frame {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("WebSocket error on {}: {}", conn_id, e);
                        break;
                    }
                };

                match msg {
                    Message::Text(_) | Message::Binary(_) => {
                        let report = service.registry().broadcast(&conn_id, msg);
                        debug!(
                            "Relayed frame from {}: delivered={} dropped={} closed={}",
                            conn_id, report.delivered, report.dropped, report.closed
                        );
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let remaining = service.registry().remove(&conn_id);
    info!("Client {} disconnected. Total clients: {}", conn_id, remaining);
}
