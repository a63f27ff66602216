use crate::error::ClientResult;
use async_trait::async_trait;
use localcom_core::ChatRecord;

mod json_file_store;
mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Durable chat history keyed by record id.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Stores `record`, replacing an existing record with the same id.
    async fn append(&self, record: &ChatRecord) -> ClientResult<()>;

    /// All records in insertion order.
    async fn read_all(&self) -> ClientResult<Vec<ChatRecord>>;
}

fn upsert(records: &mut Vec<ChatRecord>, record: &ChatRecord) {
    match records.iter_mut().find(|r| r.id == record.id) {
        Some(slot) => *slot = record.clone(),
        None => records.push(record.clone()),
    }
}
