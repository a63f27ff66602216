use crate::error::ClientResult;
use async_trait::async_trait;
use localcom_core::SignalMessage;

mod relay_link;

pub use relay_link::RelayLink;

/// Outbound half of the signaling path.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send_signal(&self, msg: SignalMessage) -> ClientResult<()>;
}
