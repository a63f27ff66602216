use super::{ChatStore, upsert};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use localcom_core::ChatRecord;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// History persisted as a JSON array in a single file.
///
/// Every append rewrites the file through a temporary sibling and a rename,
/// so a crash leaves either the old or the new history on disk.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Vec<ChatRecord>>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ClientError::Store(format!("{} is not a chat history: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(ClientError::Store(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        debug!("Loaded {} chat records from {}", records.len(), path.display());
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, records: &[ChatRecord]) -> ClientResult<()> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| ClientError::Store(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::Store(e.to_string()))?;
        }
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| ClientError::Store(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ClientError::Store(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ChatStore for JsonFileStore {
    async fn append(&self, record: &ChatRecord) -> ClientResult<()> {
        let mut records = self.records.lock().await;
        let mut next = records.clone();
        upsert(&mut next, record);

        self.write(&next).await?;
        *records = next;
        Ok(())
    }

    async fn read_all(&self) -> ClientResult<Vec<ChatRecord>> {
        Ok(self.records.lock().await.clone())
    }
}
