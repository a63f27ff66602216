use localcom_client::{CallState, EngineEvent};
use localcom_core::{IceCandidate, SessionDescription, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{Harness, MockOptions};

fn candidate(n: u8) -> IceCandidate {
    let mut c = IceCandidate::new(format!("candidate:{n} 1 udp 2122260223 192.168.1.{n} 5000 typ host"));
    c.sdp_mid = Some("0".into());
    c.sdp_m_line_index = Some(0);
    c
}

#[tokio::test]
async fn test_candidate_without_session_is_discarded() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;

    h.controller
        .handle_signal(SignalMessage::Candidate(candidate(1)))
        .await;

    assert_eq!(h.backend.session_count(), 0);
    assert_eq!(h.controller.call_state(), CallState::Idle);

    // A discarded candidate does not leak into a later session.
    h.controller.start_call().await.unwrap();
    h.controller
        .handle_signal(SignalMessage::Answer(SessionDescription::answer("v=0")))
        .await;
    assert!(h.backend.with_session(0, |log| log.candidates.is_empty()));
}

#[tokio::test]
async fn test_early_candidates_wait_for_answer() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;
    h.controller.start_call().await.unwrap();

    for n in 1..=2 {
        let text = SignalMessage::Candidate(candidate(n)).to_json().unwrap();
        h.controller.handle_signal_text(&text).await;
    }
    assert!(h.backend.with_session(0, |log| log.candidates.is_empty()));

    h.controller
        .handle_signal(SignalMessage::Answer(SessionDescription::answer("v=0")))
        .await;
    assert_eq!(
        h.backend.with_session(0, |log| log.candidates.clone()),
        vec![candidate(1), candidate(2)]
    );

    h.controller
        .handle_signal(SignalMessage::Candidate(candidate(3)))
        .await;
    assert_eq!(h.backend.with_session(0, |log| log.candidates.len()), 3);
}

#[tokio::test]
async fn test_callee_applies_candidates_directly() {
    init_tracing();

    let mut h = Harness::connected(MockOptions::default()).await;
    h.controller
        .handle_remote_offer(SessionDescription::offer("v=0"))
        .await
        .unwrap();

    h.controller
        .handle_signal(SignalMessage::Candidate(candidate(7)))
        .await;

    assert_eq!(
        h.backend.with_session(0, |log| log.candidates.clone()),
        vec![candidate(7)]
    );
}

#[tokio::test]
async fn test_rejected_candidate_keeps_session() {
    init_tracing();

    let mut h = Harness::connected(MockOptions {
        fail_add_candidate: true,
        ..Default::default()
    })
    .await;
    h.controller
        .handle_remote_offer(SessionDescription::offer("v=0"))
        .await
        .unwrap();
    let session = h.controller.session_id();

    h.controller
        .handle_signal(SignalMessage::Candidate(candidate(1)))
        .await;

    assert_eq!(h.controller.session_id(), session);
    assert_eq!(h.controller.call_state(), CallState::Calling);
}

#[tokio::test]
async fn test_local_candidates_only_while_linked() {
    init_tracing();

    let mut h = Harness::connected(MockOptions {
        emit_local_candidate: true,
        ..Default::default()
    })
    .await;

    h.controller.start_call().await.unwrap();
    h.pump().await;
    assert_eq!(h.signal.kinds(), vec!["offer", "candidate"]);

    h.signal.clear();
    h.controller.handle_event(EngineEvent::LinkConnecting).await;

    let session = h.controller.session_id().unwrap();
    h.controller
        .handle_event(EngineEvent::LocalCandidate {
            session,
            candidate: candidate(9),
        })
        .await;

    assert!(h.signal.sent().is_empty());
}
