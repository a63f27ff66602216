use std::sync::Arc;
use std::time::Duration;

use localcom_client::{
    CallState, Controller, ControllerConfig, ControllerHandle, ControllerUpdate, LinkState,
    MemoryStore, Notice, RelayLink, engine_channel,
};
use tokio::sync::mpsc;

use crate::integration::init_tracing;
use crate::utils::{LocalRelay, MockBackend, MockOptions};

struct Peer {
    handle: ControllerHandle,
    updates: mpsc::UnboundedReceiver<ControllerUpdate>,
    backend: Arc<MockBackend>,
    _link: Arc<RelayLink>,
}

fn join(url: &str, options: MockOptions) -> Peer {
    let backend = MockBackend::new(options);
    let (events_tx, events_rx) = engine_channel();
    let link = Arc::new(RelayLink::spawn(url, events_tx.clone()));

    let (controller, updates) = Controller::new(
        ControllerConfig::default(),
        backend.clone(),
        Arc::new(MemoryStore::new()),
        link.clone(),
        events_tx,
    );

    Peer {
        handle: controller.spawn(events_rx),
        updates,
        backend,
        _link: link,
    }
}

/// Reads updates until `wanted` shows up or the timeout passes.
async fn wait_for(
    updates: &mut mpsc::UnboundedReceiver<ControllerUpdate>,
    wanted: ControllerUpdate,
    timeout_ms: u64,
) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        match tokio::time::timeout_at(deadline, updates.recv()).await {
            Ok(Some(update)) if update == wanted => return true,
            Ok(Some(_)) => continue,
            _ => return false,
        }
    }
}

async fn wait_until(timeout_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test]
async fn test_two_controllers_reach_in_call() {
    init_tracing();

    let relay = LocalRelay::start().await;
    let options = MockOptions {
        emit_media: true,
        emit_local_candidate: true,
        ..Default::default()
    };

    let mut a = join(&relay.ws_url(), options.clone());
    let mut b = join(&relay.ws_url(), options);

    let connected = ControllerUpdate::Link(LinkState::Connected);
    assert!(wait_for(&mut a.updates, connected.clone(), 2000).await);
    assert!(wait_for(&mut b.updates, connected, 2000).await);
    assert!(relay.wait_for_connections(2, 2000).await);

    a.handle.start_call().await.unwrap();

    let in_call = ControllerUpdate::Call(CallState::InCall);
    assert!(wait_for(&mut b.updates, in_call.clone(), 3000).await, "callee never saw media");
    assert!(wait_for(&mut a.updates, in_call, 3000).await, "caller never saw media");

    // Each side's candidate crosses the relay and lands in the other session.
    assert!(
        wait_until(2000, || {
            a.backend.with_session(0, |log| log.candidates.len()) == 1
                && b.backend.with_session(0, |log| log.candidates.len()) == 1
        })
        .await
    );

    assert_eq!(a.backend.session_count(), 1);
    assert_eq!(b.backend.session_count(), 1);

    a.handle.hang_up().await.unwrap();
    assert!(wait_for(&mut a.updates, ControllerUpdate::Call(CallState::Idle), 1000).await);

    a.handle.shutdown().await;
    b.handle.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_relay_is_reported() {
    init_tracing();

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut peer = join(&format!("ws://{}/api/ws", addr), MockOptions::default());

    let mut saw_notice = false;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while let Ok(Some(update)) = tokio::time::timeout_at(deadline, peer.updates.recv()).await {
        if let ControllerUpdate::Notice(Notice::RelayUnreachable(_)) = update {
            saw_notice = true;
            break;
        }
    }
    assert!(saw_notice);

    let err = peer.handle.start_call().await.unwrap_err();
    assert!(matches!(err, localcom_client::ClientError::Link(_)));
}
