use super::{Controller, SessionRole};
use localcom_core::{IceCandidate, SessionDescription, SignalMessage};
use tracing::{debug, error, info, warn};

impl Controller {
    /// Decodes one text frame from the relay. Frames that are not a known
    /// envelope are logged and dropped.
    pub async fn handle_signal_text(&mut self, text: &str) {
        match SignalMessage::from_json(text) {
            Ok(msg) => self.handle_signal(msg).await,
            Err(e) => warn!("Ignoring signaling frame: {}", e),
        }
    }

    pub async fn handle_signal(&mut self, msg: SignalMessage) {
        debug!("WS IN: {}", msg.kind());

        match msg {
            SignalMessage::Offer(offer) => {
                // Refusals are logged and surfaced inside the handler.
                let _ = self.handle_remote_offer(offer).await;
            }
            SignalMessage::Answer(answer) => self.handle_remote_answer(answer).await,
            SignalMessage::Candidate(candidate) => self.handle_remote_candidate(candidate).await,
        }
    }

    async fn handle_remote_answer(&mut self, answer: SessionDescription) {
        let Some(session) = self.session.as_mut() else {
            warn!("Received answer without an active session, ignoring");
            return;
        };
        if session.role != SessionRole::Caller || session.remote_description_set {
            warn!("Unexpected answer for session {}, ignoring", session.id);
            return;
        }

        if let Err(e) = session.peer.set_remote_description(answer).await {
            error!("Failed to apply answer for session {}: {}", session.id, e);
            return;
        }
        session.remote_description_set = true;
        info!("Remote description set (answer) for session {}", session.id);

        session.flush_pending_candidates().await;
    }

    async fn handle_remote_candidate(&mut self, candidate: IceCandidate) {
        let Some(session) = self.session.as_mut() else {
            debug!("No active session, discarding candidate");
            return;
        };
        session.add_remote_candidate(candidate).await;
    }
}
