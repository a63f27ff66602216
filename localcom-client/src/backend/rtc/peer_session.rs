use super::RtcDataChannel;
use super::convert::{
    from_rtc_candidate, from_rtc_description, peer_state, to_rtc_candidate, to_rtc_description,
    to_rtc_ice_servers,
};
use crate::backend::{DataChannel, LocalAudio, PeerSession};
use crate::error::ClientResult;
use crate::event::{EngineEvent, SessionId};
use async_trait::async_trait;
use localcom_core::{IceCandidate, IceServerConfig, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

pub struct RtcPeerSession {
    id: SessionId,
    peer_connection: Arc<RTCPeerConnection>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl RtcPeerSession {
    /// Builds a peer connection and routes its callbacks into `events`.
    pub async fn new(
        id: SessionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> ClientResult<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: to_rtc_ice_servers(ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state for session {}: {}", id, s);
                    let _ = tx.send(EngineEvent::PeerState {
                        session: id,
                        state: peer_state(s),
                    });
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local candidate: {}", e);
                        return;
                    }
                };
                let _ = tx.send(EngineEvent::LocalCandidate {
                    session: id,
                    candidate: from_rtc_candidate(init),
                });
            })
        }));

        let dc_tx = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();

            Box::pin(async move {
                debug!("Remote DataChannel '{}' for session {}", dc.label(), id);
                let channel = RtcDataChannel::wire(id, dc, tx.clone());
                let _ = tx.send(EngineEvent::DataChannel {
                    session: id,
                    channel,
                });
            })
        }));

        let track_tx = events.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();

            Box::pin(async move {
                let stream_id = track.stream_id();
                info!(
                    "Remote {} track on stream {} for session {}",
                    track.kind(),
                    stream_id,
                    id
                );

                // Playback sink: keep the track drained so the receiver does not stall.
                tokio::spawn(async move { while track.read_rtp().await.is_ok() {} });

                let _ = tx.send(EngineEvent::RemoteTrack {
                    session: id,
                    stream_id,
                });
            })
        }));

        Ok(Self {
            id,
            peer_connection,
            events,
        })
    }
}

#[async_trait]
impl PeerSession for RtcPeerSession {
    async fn create_offer(&self) -> ClientResult<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        from_rtc_description(offer)
    }

    async fn create_answer(&self) -> ClientResult<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        from_rtc_description(answer)
    }

    async fn set_local_description(&self, desc: SessionDescription) -> ClientResult<()> {
        self.peer_connection
            .set_local_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> ClientResult<()> {
        self.peer_connection
            .set_remote_description(to_rtc_description(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> ClientResult<()> {
        self.peer_connection
            .add_ice_candidate(to_rtc_candidate(candidate))
            .await?;
        Ok(())
    }

    async fn add_local_audio(&self, audio: &LocalAudio) -> ClientResult<()> {
        for track in audio.tracks() {
            let sender = self.peer_connection.add_track(Arc::clone(track)).await?;

            // RTCP has to be read for the interceptors to run.
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1500];
                while sender.read(&mut buf).await.is_ok() {}
            });
        }
        Ok(())
    }

    async fn create_data_channel(&self, label: &str) -> ClientResult<Arc<dyn DataChannel>> {
        let dc = self.peer_connection.create_data_channel(label, None).await?;
        debug!("Created DataChannel '{}' for session {}", label, self.id);
        let channel: Arc<dyn DataChannel> = RtcDataChannel::wire(self.id, dc, self.events.clone());
        Ok(channel)
    }

    async fn close(&self) -> ClientResult<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
