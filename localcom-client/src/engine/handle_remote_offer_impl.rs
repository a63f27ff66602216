use super::{Controller, Session, SessionRole};
use crate::backend::LocalAudio;
use crate::error::{ClientError, ClientResult};
use crate::event::Notice;
use crate::state::CallTrigger;
use localcom_core::{SessionDescription, SignalMessage};
use tracing::{error, info, warn};

impl Controller {
    /// Callee path. Only an idle controller takes an offer; while a session
    /// exists the offer is logged and ignored.
    pub async fn handle_remote_offer(&mut self, offer: SessionDescription) -> ClientResult<()> {
        if self.session.is_some() || !self.transition(CallTrigger::OfferAccepted) {
            warn!("Session already active, ignoring offer");
            return Err(ClientError::SessionActive);
        }

        let audio = match self.backend.acquire_local_audio().await {
            Ok(audio) => audio,
            Err(e) => {
                // The caller is not told and stays in `calling`.
                self.notify(Notice::MicrophoneUnavailable(e.to_string()));
                self.transition(CallTrigger::Teardown);
                return Err(e);
            }
        };

        if let Err(e) = self.open_callee_session(offer, audio).await {
            error!("Failed to answer offer: {}", e);
            self.hang_up().await;
            self.notify(Notice::CallFailed(e.to_string()));
            return Err(e);
        }
        Ok(())
    }

    async fn open_callee_session(
        &mut self,
        offer: SessionDescription,
        audio: LocalAudio,
    ) -> ClientResult<()> {
        let id = self.allocate_session_id();
        let peer = match self.backend.create_session(id, self.events_tx.clone()).await {
            Ok(peer) => peer,
            Err(e) => {
                audio.stop();
                return Err(e);
            }
        };

        let session = self.session.insert(Session::new(id, SessionRole::Callee, peer));
        session.local_audio = Some(audio.clone());

        session.peer.set_remote_description(offer).await?;
        session.remote_description_set = true;
        session.flush_pending_candidates().await;

        session.peer.add_local_audio(&audio).await?;

        let answer = session.peer.create_answer().await?;
        session.peer.set_local_description(answer.clone()).await?;

        info!("Sending answer for session {}", id);
        self.signal.send_signal(SignalMessage::Answer(answer)).await
    }
}
