use super::convert::channel_state;
use crate::backend::{ChannelState, DataChannel};
use crate::error::ClientResult;
use crate::event::{EngineEvent, SessionId};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;

pub struct RtcDataChannel {
    inner: Arc<RTCDataChannel>,
}

impl RtcDataChannel {
    /// Hooks open, close and message callbacks of `channel` into `events`.
    pub(super) fn wire(
        session: SessionId,
        channel: Arc<RTCDataChannel>,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Arc<Self> {
        let open_tx = events.clone();
        let label = channel.label().to_owned();
        channel.on_open(Box::new(move || {
            let tx = open_tx.clone();
            let label = label.clone();

            Box::pin(async move {
                info!("DataChannel '{}' open for session {}", label, session);
                let _ = tx.send(EngineEvent::ChannelState {
                    session,
                    state: ChannelState::Open,
                });
            })
        }));

        let close_tx = events.clone();
        channel.on_close(Box::new(move || {
            let tx = close_tx.clone();

            Box::pin(async move {
                debug!("DataChannel closed for session {}", session);
                let _ = tx.send(EngineEvent::ChannelState {
                    session,
                    state: ChannelState::Closed,
                });
            })
        }));

        let msg_tx = events;
        channel.on_message(Box::new(move |msg: DataChannelMessage| {
            let tx = msg_tx.clone();

            Box::pin(async move {
                let text = String::from_utf8_lossy(&msg.data).into_owned();
                let _ = tx.send(EngineEvent::ChannelMessage { session, text });
            })
        }));

        Arc::new(Self { inner: channel })
    }
}

#[async_trait]
impl DataChannel for RtcDataChannel {
    fn label(&self) -> String {
        self.inner.label().to_owned()
    }

    fn state(&self) -> ChannelState {
        channel_state(self.inner.ready_state())
    }

    async fn send_text(&self, text: &str) -> ClientResult<()> {
        self.inner.send_text(text.to_owned()).await?;
        Ok(())
    }

    async fn close(&self) -> ClientResult<()> {
        self.inner.close().await?;
        Ok(())
    }
}
