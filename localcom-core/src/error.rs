use thiserror::Error;

/// Failures while decoding a signaling envelope.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("signaling message must be a JSON object")]
    NotAnObject,

    #[error("no offer, answer or candidate key present")]
    UnknownShape,

    #[error("more than one signaling key present: {0:?}")]
    Ambiguous(Vec<String>),
}
