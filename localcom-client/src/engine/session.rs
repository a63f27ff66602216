use crate::backend::{DataChannel, LocalAudio, PeerSession};
use crate::event::SessionId;
use localcom_core::IceCandidate;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Caller,
    Callee,
}

/// The one negotiation session a controller may hold.
pub(super) struct Session {
    pub(super) id: SessionId,
    pub(super) role: SessionRole,
    pub(super) peer: Box<dyn PeerSession>,
    pub(super) local_audio: Option<LocalAudio>,
    pub(super) channel: Option<Arc<dyn DataChannel>>,
    pub(super) remote_audio: Option<String>,
    pub(super) remote_description_set: bool,
    /// Remote candidates received before the remote description.
    pub(super) pending_candidates: Vec<IceCandidate>,
}

impl Session {
    pub(super) fn new(id: SessionId, role: SessionRole, peer: Box<dyn PeerSession>) -> Self {
        Self {
            id,
            role,
            peer,
            local_audio: None,
            channel: None,
            remote_audio: None,
            remote_description_set: false,
            pending_candidates: Vec::new(),
        }
    }

    pub(super) async fn add_remote_candidate(&mut self, candidate: IceCandidate) {
        if !self.remote_description_set {
            debug!("Buffering candidate for session {} until remote description", self.id);
            self.pending_candidates.push(candidate);
            return;
        }

        if let Err(e) = self.peer.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate for session {}: {}", self.id, e);
        }
    }

    pub(super) async fn flush_pending_candidates(&mut self) {
        let pending = std::mem::take(&mut self.pending_candidates);
        if !pending.is_empty() {
            debug!("Applying {} buffered candidates for session {}", pending.len(), self.id);
        }

        for candidate in pending {
            if let Err(e) = self.peer.add_ice_candidate(candidate).await {
                warn!("Failed to add ICE candidate for session {}: {}", self.id, e);
            }
        }
    }

    /// Releases everything the session holds. Failures are logged only.
    pub(super) async fn close(mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("Closing data channel for session {}: {}", self.id, e);
            }
        }
        if let Err(e) = self.peer.close().await {
            debug!("Closing peer connection for session {}: {}", self.id, e);
        }
        if let Some(audio) = self.local_audio.take() {
            audio.stop();
        }
        self.remote_audio = None;
    }
}
