use super::{ChatStore, upsert};
use crate::error::ClientResult;
use async_trait::async_trait;
use localcom_core::ChatRecord;
use tokio::sync::Mutex;

/// History that lives as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ChatRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ChatRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn append(&self, record: &ChatRecord) -> ClientResult<()> {
        upsert(&mut *self.records.lock().await, record);
        Ok(())
    }

    async fn read_all(&self) -> ClientResult<Vec<ChatRecord>> {
        Ok(self.records.lock().await.clone())
    }
}
