use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    Local,
    Remote,
}

/// One chat line as stored in the local history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    /// Milliseconds since the Unix epoch, strictly increasing per clock.
    pub id: u64,
    pub text: String,
    pub sender: ChatSender,
    /// Local wall-clock time for display, `HH:MM:SS`.
    pub send_time: String,
}

/// Hands out record ids and display times.
#[derive(Debug, Default)]
pub struct RecordClock {
    last_id: u64,
}

impl RecordClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes after the highest id already present in history.
    pub fn resume_after(last_id: u64) -> Self {
        Self { last_id }
    }

    pub fn next_id(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        self.last_id = now.max(self.last_id + 1);
        self.last_id
    }

    pub fn stamp(&mut self, text: impl Into<String>, sender: ChatSender) -> ChatRecord {
        ChatRecord {
            id: self.next_id(),
            text: text.into(),
            sender,
            send_time: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}
