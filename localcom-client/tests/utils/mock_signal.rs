use std::sync::Mutex;

use async_trait::async_trait;
use localcom_client::{ClientResult, SignalSink};
use localcom_core::SignalMessage;

/// Captures every envelope the controller hands to the relay.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SignalMessage>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(|m| m.kind()).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn send_signal(&self, msg: SignalMessage) -> ClientResult<()> {
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}
