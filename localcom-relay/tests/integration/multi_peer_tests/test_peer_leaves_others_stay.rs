use crate::integration::init_tracing;
use crate::utils::{TestClient, TestRelay};

#[tokio::test]
async fn test_peer_leaves_others_stay() {
    init_tracing();

    let relay = TestRelay::start().await;

    let mut a = TestClient::connect(&relay.ws_url()).await.unwrap();
    let mut b = TestClient::connect(&relay.ws_url()).await.unwrap();
    let c = TestClient::connect(&relay.ws_url()).await.unwrap();
    assert!(relay.wait_for_connections(3, 2000).await);

    c.close().await;
    assert!(relay.wait_for_connections(2, 2000).await);

    b.send_text("still here").await;
    assert_eq!(a.recv_text(2000).await.as_deref(), Some("still here"));

    // A late joiner sees only traffic sent after it connected.
    let mut d = TestClient::connect(&relay.ws_url()).await.unwrap();
    assert!(relay.wait_for_connections(3, 2000).await);
    assert!(d.expect_silence(200).await, "Relay keeps no history");

    a.send_text("hello d").await;
    assert_eq!(d.recv_text(2000).await.as_deref(), Some("hello d"));
    assert_eq!(b.recv_text(2000).await.as_deref(), Some("hello d"));
}
