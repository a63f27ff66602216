//! Negotiation controller for LocalCom peers.
//!
//! A [`Controller`] drives one relay link and at most one peer session:
//! it turns signaling envelopes and runtime callbacks ([`EngineEvent`]) into
//! call-state transitions, and records chat traffic in a [`ChatStore`].

pub mod backend;
mod engine;
mod error;
mod event;
mod handle;
pub mod link;
mod state;
pub mod store;

pub use backend::{
    ChannelState, DataChannel, LocalAudio, MediaBackend, PeerSession, PeerState, RtcBackend,
    RtcBackendConfig,
};
pub use engine::{Controller, ControllerConfig, SessionRole};
pub use error::{ClientError, ClientResult};
pub use event::*;
pub use handle::ControllerHandle;
pub use link::{RelayLink, SignalSink};
pub use state::{CallState, CallTrigger, LinkState};
pub use store::{ChatStore, JsonFileStore, MemoryStore};
