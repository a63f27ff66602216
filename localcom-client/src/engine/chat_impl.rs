use super::Controller;
use crate::error::{ClientError, ClientResult};
use crate::event::{ControllerUpdate, Notice};
use localcom_core::{ChatRecord, ChatSender};
use tracing::{debug, error};

impl Controller {
    /// Sends `text` over the open chat channel and records it as local.
    pub async fn send_chat(&mut self, text: &str) -> ClientResult<ChatRecord> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }
        let Some(channel) = self.open_channel() else {
            self.notify(Notice::ChatUnavailable);
            return Err(ClientError::ChannelUnavailable);
        };

        channel.send_text(text).await?;

        let record = self.clock.stamp(text, ChatSender::Local);
        self.record(record.clone()).await;
        Ok(record)
    }

    pub(super) async fn receive_chat(&mut self, text: String) {
        debug!("Chat message received ({} bytes)", text.len());
        let record = self.clock.stamp(text, ChatSender::Remote);
        self.record(record).await;
    }

    async fn record(&mut self, record: ChatRecord) {
        if let Err(e) = self.store.append(&record).await {
            error!("Failed to persist chat record {}: {}", record.id, e);
        }
        self.history.push(record.clone());
        self.publish(ControllerUpdate::Chat(record));
    }
}
