use std::sync::Arc;
use std::time::Duration;

use localcom_client::{
    CallState, Controller, ControllerConfig, ControllerHandle, ControllerUpdate, EngineEvent,
    LinkState, MemoryStore, RelayLink, RtcBackend, RtcBackendConfig, engine_channel,
};
use localcom_core::ChatSender;
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{LocalRelay, RecordingSink};

/// Host candidates only, so the test never leaves the machine.
fn local_backend() -> Arc<RtcBackend> {
    Arc::new(RtcBackend::new(RtcBackendConfig {
        ice_servers: Vec::new(),
        audio_input: true,
    }))
}

struct RtcPeer {
    handle: ControllerHandle,
    updates: mpsc::UnboundedReceiver<ControllerUpdate>,
    _link: Arc<RelayLink>,
}

fn join(url: &str) -> RtcPeer {
    let (events_tx, events_rx) = engine_channel();
    let link = Arc::new(RelayLink::spawn(url, events_tx.clone()));

    let (controller, updates) = Controller::new(
        ControllerConfig::default(),
        local_backend(),
        Arc::new(MemoryStore::new()),
        link.clone(),
        events_tx,
    );

    RtcPeer {
        handle: controller.spawn(events_rx),
        updates,
        _link: link,
    }
}

/// Reads updates until every one of `wanted` has been seen, in any order.
async fn wait_for_all(
    updates: &mut mpsc::UnboundedReceiver<ControllerUpdate>,
    mut wanted: Vec<ControllerUpdate>,
    timeout: Duration,
) -> Vec<ControllerUpdate> {
    let deadline = tokio::time::Instant::now() + timeout;

    while !wanted.is_empty() {
        match tokio::time::timeout_at(deadline, updates.recv()).await {
            Ok(Some(update)) => wanted.retain(|w| *w != update),
            _ => break,
        }
    }
    wanted
}

async fn wait_for_chat(
    updates: &mut mpsc::UnboundedReceiver<ControllerUpdate>,
    text: &str,
    timeout: Duration,
) -> Option<ChatSender> {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match tokio::time::timeout_at(deadline, updates.recv()).await {
            Ok(Some(ControllerUpdate::Chat(record))) if record.text == text => {
                return Some(record.sender);
            }
            Ok(Some(_)) => continue,
            _ => return None,
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rtc_peers_reach_in_call_and_chat() {
    init_tracing();

    let relay = LocalRelay::start().await;
    let mut a = join(&relay.ws_url());
    let mut b = join(&relay.ws_url());

    let connected = vec![ControllerUpdate::Link(LinkState::Connected)];
    assert!(wait_for_all(&mut a.updates, connected.clone(), Duration::from_secs(2)).await.is_empty());
    assert!(wait_for_all(&mut b.updates, connected, Duration::from_secs(2)).await.is_empty());
    assert!(relay.wait_for_connections(2, 2000).await);

    a.handle.start_call().await.unwrap();

    // In-call only follows inbound media, so both sides must be sending frames.
    let ready = vec![
        ControllerUpdate::Call(CallState::InCall),
        ControllerUpdate::ChatAvailable(true),
    ];
    let missing = wait_for_all(&mut b.updates, ready.clone(), Duration::from_secs(15)).await;
    assert!(missing.is_empty(), "callee still waiting for {:?}", missing);
    let missing = wait_for_all(&mut a.updates, ready, Duration::from_secs(15)).await;
    assert!(missing.is_empty(), "caller still waiting for {:?}", missing);

    let sent = a.handle.send_chat("hello over the data channel").await.unwrap();
    assert_eq!(sent.sender, ChatSender::Local);
    assert_eq!(
        wait_for_chat(&mut b.updates, "hello over the data channel", Duration::from_secs(5)).await,
        Some(ChatSender::Remote)
    );

    tokio::time::timeout(Duration::from_secs(5), a.handle.hang_up())
        .await
        .expect("hang-up did not finish")
        .unwrap();
    let idle = vec![ControllerUpdate::Call(CallState::Idle)];
    assert!(wait_for_all(&mut a.updates, idle, Duration::from_secs(2)).await.is_empty());

    a.handle.shutdown().await;
    b.handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rtc_hang_up_with_undrained_events() {
    init_tracing();

    let signal = Arc::new(RecordingSink::default());
    let (events_tx, _events_rx) = engine_channel();

    let (mut controller, _updates) = Controller::new(
        ControllerConfig::default(),
        local_backend(),
        Arc::new(MemoryStore::new()),
        signal.clone(),
        events_tx.clone(),
    );
    controller.handle_event(EngineEvent::LinkOpened).await;

    controller.start_call().await.unwrap();
    assert_eq!(signal.kinds(), vec!["offer"]);

    // Nobody drains the queue while the session is closed.
    for i in 0..1024 {
        events_tx
            .send(EngineEvent::Signal(format!("noise {}", i)))
            .unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), controller.hang_up())
        .await
        .expect("hang-up blocked on the event queue");

    assert_eq!(controller.call_state(), CallState::Idle);
    assert!(controller.session_id().is_none());
}
