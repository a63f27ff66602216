use localcom_client::{
    CallState, ChannelState, ControllerUpdate, DataChannel, EngineEvent, LinkState, Notice,
    PeerState,
};
use localcom_core::{SessionDescription, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{Harness, MockOptions};

#[tokio::test]
async fn test_hang_up_releases_everything() {
    init_tracing();

    let mut h = Harness::connected(MockOptions {
        emit_media: true,
        open_channels: true,
        ..Default::default()
    })
    .await;

    h.controller.start_call().await.unwrap();
    h.controller
        .handle_signal(SignalMessage::Answer(SessionDescription::answer("v=0")))
        .await;
    h.pump().await;
    assert_eq!(h.controller.call_state(), CallState::InCall);
    assert!(h.controller.chat_available());

    h.controller.hang_up().await;

    assert_eq!(h.controller.call_state(), CallState::Idle);
    assert!(h.controller.session_id().is_none());
    assert!(h.controller.remote_audio().is_none());
    assert!(!h.controller.chat_available());
    assert!(h.backend.with_session(0, |log| log.closed));
    assert!(!h.backend.audio()[0].is_live());
    assert_eq!(h.backend.channels()[0].state(), ChannelState::Closed);
}

#[tokio::test]
async fn test_hang_up_while_idle_is_noop() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;

    h.controller.hang_up().await;
    h.controller.hang_up().await;

    assert_eq!(h.controller.call_state(), CallState::Idle);
    assert!(h.updates().is_empty());
}

#[tokio::test]
async fn test_hang_up_from_calling() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;
    h.controller.start_call().await.unwrap();

    h.controller.hang_up().await;
    h.controller.hang_up().await;

    assert_eq!(h.controller.call_state(), CallState::Idle);
    assert_eq!(
        h.updates(),
        vec![
            ControllerUpdate::Call(CallState::Calling),
            ControllerUpdate::Call(CallState::Idle),
        ]
    );
}

#[tokio::test]
async fn test_link_loss_forces_idle() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;
    h.controller
        .handle_remote_offer(SessionDescription::offer("v=0"))
        .await
        .unwrap();

    h.controller
        .handle_event(EngineEvent::LinkClosed {
            reason: Some("connection reset".into()),
        })
        .await;

    assert_eq!(h.controller.link_state(), LinkState::Disconnected);
    assert_eq!(h.controller.call_state(), CallState::Idle);
    assert!(h.controller.session_id().is_none());
    assert!(!h.backend.audio()[0].is_live());

    let updates = h.updates();
    assert!(updates.contains(&ControllerUpdate::Link(LinkState::Disconnected)));
    assert!(updates.contains(&ControllerUpdate::Notice(Notice::RelayUnreachable(
        "connection reset".into()
    ))));
}

#[tokio::test]
async fn test_fatal_peer_state_hangs_up() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;
    h.controller.start_call().await.unwrap();
    let session = h.controller.session_id().unwrap();

    h.controller
        .handle_event(EngineEvent::PeerState {
            session,
            state: PeerState::Disconnected,
        })
        .await;
    assert_eq!(h.controller.call_state(), CallState::Calling);

    h.controller
        .handle_event(EngineEvent::PeerState {
            session,
            state: PeerState::Failed,
        })
        .await;
    assert_eq!(h.controller.call_state(), CallState::Idle);
}

#[tokio::test]
async fn test_events_from_old_session_are_dropped() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;
    h.controller.start_call().await.unwrap();
    let old = h.controller.session_id().unwrap();
    h.controller.hang_up().await;

    h.controller.start_call().await.unwrap();
    let current = h.controller.session_id().unwrap();
    assert_ne!(old, current);

    h.controller
        .handle_event(EngineEvent::RemoteTrack {
            session: old,
            stream_id: "ghost".into(),
        })
        .await;
    h.controller
        .handle_event(EngineEvent::PeerState {
            session: old,
            state: PeerState::Closed,
        })
        .await;

    assert_eq!(h.controller.call_state(), CallState::Calling);
    assert_eq!(h.controller.session_id(), Some(current));
    assert!(h.controller.remote_audio().is_none());
}
