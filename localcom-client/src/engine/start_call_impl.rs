use super::{Controller, Session, SessionRole};
use crate::backend::LocalAudio;
use crate::error::{ClientError, ClientResult};
use crate::event::Notice;
use crate::state::{CallTrigger, LinkState};
use localcom_core::SignalMessage;
use tracing::{error, info, warn};

impl Controller {
    /// Caller path: acquire the microphone, open a session with a chat
    /// channel and send `{offer}` through the relay.
    pub async fn start_call(&mut self) -> ClientResult<()> {
        if self.session.is_some() {
            warn!("Call already in progress, not starting another");
            return Err(ClientError::SessionActive);
        }
        if self.link != LinkState::Connected {
            self.notify(Notice::RelayUnreachable(
                "not connected to the relay".to_owned(),
            ));
            return Err(ClientError::Link("relay link is not connected".to_owned()));
        }
        if !self.transition(CallTrigger::Dial) {
            return Err(ClientError::SessionActive);
        }

        let audio = match self.backend.acquire_local_audio().await {
            Ok(audio) => audio,
            Err(e) => {
                self.notify(Notice::MicrophoneUnavailable(e.to_string()));
                self.transition(CallTrigger::Teardown);
                return Err(e);
            }
        };

        if let Err(e) = self.open_caller_session(audio).await {
            error!("Failed to start call: {}", e);
            self.hang_up().await;
            self.notify(Notice::CallFailed(e.to_string()));
            return Err(e);
        }
        Ok(())
    }

    async fn open_caller_session(&mut self, audio: LocalAudio) -> ClientResult<()> {
        let id = self.allocate_session_id();
        let peer = match self.backend.create_session(id, self.events_tx.clone()).await {
            Ok(peer) => peer,
            Err(e) => {
                audio.stop();
                return Err(e);
            }
        };

        let session = self.session.insert(Session::new(id, SessionRole::Caller, peer));
        session.local_audio = Some(audio.clone());
        session.peer.add_local_audio(&audio).await?;

        let channel = session
            .peer
            .create_data_channel(&self.config.chat_label)
            .await?;
        session.channel = Some(channel);

        let offer = session.peer.create_offer().await?;
        session.peer.set_local_description(offer.clone()).await?;

        info!("Sending offer for session {}", id);
        self.signal.send_signal(SignalMessage::Offer(offer)).await
    }
}
