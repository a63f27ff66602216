use crate::error::ClientResult;
use crate::event::{EngineEvent, SessionId};
use async_trait::async_trait;
use localcom_core::{IceCandidate, SessionDescription};
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use webrtc::track::track_local::TrackLocal;

pub mod rtc;

pub use rtc::{RtcBackend, RtcBackendConfig};

/// Ready state of a chat data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Connection state reported by the negotiation runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl PeerState {
    /// States after which the session cannot recover and is torn down.
    pub fn is_fatal(self) -> bool {
        matches!(self, PeerState::Failed | PeerState::Closed)
    }
}

/// The microphone capture handed to a session.
#[derive(Clone)]
pub struct LocalAudio {
    stream_id: String,
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
    live: Arc<AtomicBool>,
}

impl std::fmt::Debug for LocalAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAudio")
            .field("stream_id", &self.stream_id)
            .field("tracks", &self.tracks.len())
            .field("live", &self.live)
            .finish()
    }
}

impl LocalAudio {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            tracks: Vec::new(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn tracks(&self) -> &[Arc<dyn TrackLocal + Send + Sync>] {
        &self.tracks
    }

    /// Releases the capture. Clones share the flag.
    pub fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Weak view of the live flag for tasks feeding the tracks. It stops
    /// upgrading once every clone is dropped.
    pub fn liveness(&self) -> Weak<AtomicBool> {
        Arc::downgrade(&self.live)
    }
}

/// Opens media and creates negotiation sessions.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn acquire_local_audio(&self) -> ClientResult<LocalAudio>;

    /// Creates a session whose callbacks report into `events`, tagged with `id`.
    async fn create_session(
        &self,
        id: SessionId,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> ClientResult<Box<dyn PeerSession>>;
}

/// One peer connection. Callbacks (local candidates, remote tracks, remote
/// data channels, state changes) arrive as [`EngineEvent`]s.
#[async_trait]
pub trait PeerSession: Send + Sync {
    async fn create_offer(&self) -> ClientResult<SessionDescription>;

    async fn create_answer(&self) -> ClientResult<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> ClientResult<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> ClientResult<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> ClientResult<()>;

    async fn add_local_audio(&self, audio: &LocalAudio) -> ClientResult<()>;

    async fn create_data_channel(&self, label: &str) -> ClientResult<Arc<dyn DataChannel>>;

    async fn close(&self) -> ClientResult<()>;
}

#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> String;

    fn state(&self) -> ChannelState;

    async fn send_text(&self, text: &str) -> ClientResult<()>;

    async fn close(&self) -> ClientResult<()>;
}
