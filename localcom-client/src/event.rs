use crate::backend::{ChannelState, DataChannel, PeerState};
use crate::error::ClientResult;
use crate::state::{CallState, LinkState};
use localcom_core::{ChatRecord, IceCandidate};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Identifies one negotiation session so late events from a torn-down
/// session can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the relay link and the negotiation runtime report back.
/// Consumed one at a time by the controller's transition handlers.
pub enum EngineEvent {
    LinkConnecting,
    LinkOpened,
    /// `reason` is set when the link failed rather than closed cleanly.
    LinkClosed {
        reason: Option<String>,
    },
    /// Raw text frame received from the relay.
    Signal(String),

    LocalCandidate {
        session: SessionId,
        candidate: IceCandidate,
    },
    RemoteTrack {
        session: SessionId,
        stream_id: String,
    },
    /// A data channel opened by the remote side.
    DataChannel {
        session: SessionId,
        channel: Arc<dyn DataChannel>,
    },
    ChannelState {
        session: SessionId,
        state: ChannelState,
    },
    ChannelMessage {
        session: SessionId,
        text: String,
    },
    PeerState {
        session: SessionId,
        state: PeerState,
    },
}

impl fmt::Debug for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkConnecting => f.write_str("LinkConnecting"),
            Self::LinkOpened => f.write_str("LinkOpened"),
            Self::LinkClosed { reason } => write!(f, "LinkClosed({:?})", reason),
            Self::Signal(text) => write!(f, "Signal({} bytes)", text.len()),
            Self::LocalCandidate { session, .. } => write!(f, "LocalCandidate({})", session),
            Self::RemoteTrack { session, stream_id } => {
                write!(f, "RemoteTrack({}, {})", session, stream_id)
            }
            Self::DataChannel { session, channel } => {
                write!(f, "DataChannel({}, {})", session, channel.label())
            }
            Self::ChannelState { session, state } => {
                write!(f, "ChannelState({}, {:?})", session, state)
            }
            Self::ChannelMessage { session, text } => {
                write!(f, "ChannelMessage({}, {} bytes)", session, text.len())
            }
            Self::PeerState { session, state } => write!(f, "PeerState({}, {:?})", session, state),
        }
    }
}

/// Channel carrying [`EngineEvent`]s into the controller. Unbounded so the
/// runtime callbacks never wait on the controller task that drains it.
pub fn engine_channel() -> (
    mpsc::UnboundedSender<EngineEvent>,
    mpsc::UnboundedReceiver<EngineEvent>,
) {
    mpsc::unbounded_channel()
}

/// User-facing refusals and failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MicrophoneUnavailable(String),
    ChatUnavailable,
    RelayUnreachable(String),
    CallFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MicrophoneUnavailable(detail) => {
                write!(f, "Microphone unavailable, check permissions ({})", detail)
            }
            Self::ChatUnavailable => {
                f.write_str("Chat not available: the text channel is not open, start a call")
            }
            Self::RelayUnreachable(detail) => {
                write!(f, "Could not reach the signaling server ({})", detail)
            }
            Self::CallFailed(detail) => write!(f, "Call could not be set up ({})", detail),
        }
    }
}

/// What the controller publishes to its consumer (UI, CLI, tests).
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerUpdate {
    History(Vec<ChatRecord>),
    Link(LinkState),
    Call(CallState),
    ChatAvailable(bool),
    Chat(ChatRecord),
    Notice(Notice),
}

/// Requests sent through a [`crate::ControllerHandle`].
#[derive(Debug)]
pub enum Command {
    StartCall {
        reply: oneshot::Sender<ClientResult<()>>,
    },
    HangUp {
        reply: oneshot::Sender<()>,
    },
    SendChat {
        text: String,
        reply: oneshot::Sender<ClientResult<ChatRecord>>,
    },
    Shutdown,
}
