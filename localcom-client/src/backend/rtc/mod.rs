use crate::backend::{LocalAudio, MediaBackend, PeerSession};
use crate::error::{ClientError, ClientResult};
use crate::event::{EngineEvent, SessionId};
use async_trait::async_trait;
use localcom_core::IceServerConfig;
use localcom_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Opus frame length fed to the outbound track.
const FRAME_DURATION: Duration = Duration::from_millis(20);

/// One Opus frame carrying 20 ms of silence.
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

mod convert;
mod data_channel;
mod peer_session;

pub use data_channel::RtcDataChannel;
pub use peer_session::RtcPeerSession;

#[derive(Debug, Clone)]
pub struct RtcBackendConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// When false, microphone acquisition is refused like a denied permission.
    pub audio_input: bool,
}

impl Default for RtcBackendConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
                username: None,
                credential: None,
            }],
            audio_input: true,
        }
    }
}

impl RtcBackendConfig {
    pub fn with_stun(mut self, urls: Vec<String>) -> Self {
        if !urls.is_empty() {
            self.ice_servers = vec![IceServerConfig {
                urls,
                username: None,
                credential: None,
            }];
        }
        self
    }
}

/// [`MediaBackend`] on top of the `webrtc` crate.
pub struct RtcBackend {
    config: RtcBackendConfig,
}

impl RtcBackend {
    pub fn new(config: RtcBackendConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaBackend for RtcBackend {
    async fn acquire_local_audio(&self) -> ClientResult<LocalAudio> {
        if !self.config.audio_input {
            return Err(ClientError::MediaAccess(
                "audio input is disabled".to_owned(),
            ));
        }

        let stream_id = format!("localcom-{}", uuid::Uuid::new_v4());
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            stream_id.clone(),
        ));

        info!("Microphone track ready on stream {}", stream_id);
        let audio = LocalAudio::new(stream_id).with_track(track.clone());
        tokio::spawn(pump_silence(track, audio.liveness()));
        Ok(audio)
    }

    async fn create_session(
        &self,
        id: SessionId,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> ClientResult<Box<dyn PeerSession>> {
        let session = RtcPeerSession::new(id, &self.config.ice_servers, events).await?;
        Ok(Box::new(session))
    }
}

/// Keeps `track` producing frames until the capture is stopped or dropped.
/// The remote side only reports the track once the first packet arrives.
async fn pump_silence(track: Arc<TrackLocalStaticSample>, live: Weak<AtomicBool>) {
    let mut ticker = tokio::time::interval(FRAME_DURATION);

    loop {
        ticker.tick().await;

        match live.upgrade() {
            Some(flag) if flag.load(Ordering::SeqCst) => {}
            _ => break,
        }

        let sample = Sample {
            data: OPUS_SILENCE.to_vec().into(),
            duration: FRAME_DURATION,
            ..Default::default()
        };
        if let Err(e) = track.write_sample(&sample).await {
            debug!("Writing audio frame to {} failed: {}", track.stream_id(), e);
        }
    }

    debug!("Audio pump for {} stopped", track.stream_id());
}
