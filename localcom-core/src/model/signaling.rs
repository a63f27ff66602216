use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

/// Session description in the shape browsers put on the wire
/// (`{"type": "offer", "sdp": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

/// Envelope exchanged between controllers through the relay.
///
/// Serialized with exactly one key: `{"offer": ..}`, `{"answer": ..}` or
/// `{"candidate": ..}`. The relay itself never decodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalMessage {
    Offer(SessionDescription),
    Answer(SessionDescription),
    Candidate(IceCandidate),
}

const KEYS: [&str; 3] = ["offer", "answer", "candidate"];

impl SignalMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Candidate(_) => "candidate",
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes an envelope, ignoring keys that are not one of the three shapes.
    /// A `null` value counts as absent.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut map) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let present: Vec<&str> = KEYS
            .into_iter()
            .filter(|key| map.get(*key).is_some_and(|v| !v.is_null()))
            .collect();

        match present.as_slice() {
            [] => Err(ProtocolError::UnknownShape),
            [key] => {
                let body = map.remove(*key).unwrap_or(Value::Null);
                let msg = match *key {
                    "offer" => Self::Offer(serde_json::from_value(body)?),
                    "answer" => Self::Answer(serde_json::from_value(body)?),
                    _ => Self::Candidate(serde_json::from_value(body)?),
                };
                Ok(msg)
            }
            many => Err(ProtocolError::Ambiguous(
                many.iter().map(|k| k.to_string()).collect(),
            )),
        }
    }
}
