mod chat;
mod connection;
mod signaling;

pub use chat::{ChatRecord, ChatSender, RecordClock};
pub use connection::ConnectionId;
pub use signaling::{IceCandidate, IceServerConfig, SdpType, SessionDescription, SignalMessage};
