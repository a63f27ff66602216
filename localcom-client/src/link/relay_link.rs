use super::SignalSink;
use crate::error::{ClientError, ClientResult};
use crate::event::EngineEvent;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use localcom_core::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket connection to the relay.
///
/// Inbound text frames are reported as [`EngineEvent::Signal`]; binary frames
/// are ignored. Link lifecycle is reported as `LinkConnecting`, `LinkOpened`
/// and finally `LinkClosed`.
pub struct RelayLink {
    outbound: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl RelayLink {
    pub fn spawn(url: impl Into<String>, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        let url = url.into();
        let (outbound, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_link(url, events, rx));

        Self { outbound, task }
    }

    /// Drops the connection without waiting for the close handshake.
    pub fn close(&self) {
        self.task.abort();
    }
}

impl Drop for RelayLink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl SignalSink for RelayLink {
    async fn send_signal(&self, msg: SignalMessage) -> ClientResult<()> {
        let json = msg.to_json()?;
        debug!("WS OUT: {}", msg.kind());
        self.outbound
            .send(json)
            .map_err(|_| ClientError::Link("relay link is closed".to_owned()))
    }
}

async fn run_link(
    url: String,
    events: mpsc::UnboundedSender<EngineEvent>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let _ = events.send(EngineEvent::LinkConnecting);

    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!("Failed to connect to relay {}: {}", url, e);
            let _ = events.send(EngineEvent::LinkClosed {
                reason: Some(e.to_string()),
            });
            return;
        }
    };

    info!("WS Open: {}", url);
    let _ = events.send(EngineEvent::LinkOpened);

    let (mut sink, mut source) = stream.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                debug!("Relay write failed: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    let recv_events = events.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if recv_events.send(EngineEvent::Signal(text)).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => return Some(e.to_string()),
            }
        }
        None
    });

    let reason = tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            None
        }
        res = (&mut recv_task) => {
            send_task.abort();
            res.ok().flatten()
        }
    };

    info!("WS Closed: {}", url);
    let _ = events.send(EngineEvent::LinkClosed { reason });
}
