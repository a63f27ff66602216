use super::{Controller, Session};
use crate::event::{EngineEvent, Notice, SessionId};
use crate::state::{CallTrigger, LinkState};
use localcom_core::SignalMessage;
use tracing::{debug, info, warn};

impl Controller {
    pub async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::LinkConnecting => self.set_link(LinkState::Connecting),

            EngineEvent::LinkOpened => self.set_link(LinkState::Connected),

            EngineEvent::LinkClosed { reason } => {
                self.set_link(LinkState::Disconnected);
                if let Some(reason) = reason {
                    self.notify(Notice::RelayUnreachable(reason));
                }
                // Without the relay nothing can be renegotiated.
                self.hang_up().await;
            }

            EngineEvent::Signal(text) => self.handle_signal_text(&text).await,

            EngineEvent::LocalCandidate { session, candidate } => {
                if self.current_session(session).is_none() {
                    return;
                }
                if self.link != LinkState::Connected {
                    debug!("Relay link down, dropping local candidate");
                    return;
                }
                if let Err(e) = self.signal.send_signal(SignalMessage::Candidate(candidate)).await {
                    warn!("Failed to send local candidate: {}", e);
                }
            }

            EngineEvent::RemoteTrack { session, stream_id } => {
                let Some(current) = self.current_session(session) else {
                    return;
                };
                info!("Remote audio {} attached to session {}", stream_id, session);
                current.remote_audio = Some(stream_id);
                self.transition(CallTrigger::MediaFlowing);
            }

            EngineEvent::DataChannel { session, channel } => {
                let Some(current) = self.current_session(session) else {
                    return;
                };
                if current.channel.is_some() {
                    debug!("Session {} already has a channel, ignoring '{}'", session, channel.label());
                    return;
                }
                info!("Adopted remote DataChannel '{}' for session {}", channel.label(), session);
                current.channel = Some(channel);
                self.refresh_chat_available();
            }

            EngineEvent::ChannelState { session, state } => {
                if self.current_session(session).is_none() {
                    return;
                }
                debug!("DataChannel for session {} is {:?}", session, state);
                self.refresh_chat_available();
            }

            EngineEvent::ChannelMessage { session, text } => {
                if self.current_session(session).is_none() {
                    return;
                }
                self.receive_chat(text).await;
            }

            EngineEvent::PeerState { session, state } => {
                if self.current_session(session).is_none() {
                    return;
                }
                if state.is_fatal() {
                    warn!("Peer connection for session {} is {:?}, hanging up", session, state);
                    self.hang_up().await;
                }
            }
        }
    }

    /// The live session if `id` names it. Events from torn-down sessions
    /// are dropped.
    fn current_session(&mut self, id: SessionId) -> Option<&mut Session> {
        let current = self.session.as_mut().filter(|s| s.id == id);
        if current.is_none() {
            debug!("Dropping event for stale session {}", id);
        }
        current
    }
}
