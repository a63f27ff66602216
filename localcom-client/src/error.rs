use localcom_core::ProtocolError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Microphone denied or unavailable.
    #[error("media access failed: {0}")]
    MediaAccess(String),

    /// Chat send attempted while the data channel is not open.
    #[error("chat channel is not available")]
    ChannelUnavailable,

    #[error("chat message is empty")]
    EmptyMessage,

    /// A negotiation session already exists.
    #[error("a call session is already active")]
    SessionActive,

    #[error("no call session is active")]
    NoSession,

    /// Description or candidate rejected by the negotiation runtime.
    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("relay link: {0}")]
    Link(String),

    #[error("chat store: {0}")]
    Store(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("controller has shut down")]
    ControllerGone,
}

impl From<webrtc::Error> for ClientError {
    fn from(err: webrtc::Error) -> Self {
        Self::Negotiation(err.to_string())
    }
}
