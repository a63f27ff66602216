use crate::integration::init_tracing;
use crate::utils::{TestClient, TestRelay};

#[tokio::test]
async fn test_sender_order_preserved() {
    init_tracing();

    let relay = TestRelay::start().await;

    let mut a = TestClient::connect(&relay.ws_url()).await.unwrap();
    let mut b = TestClient::connect(&relay.ws_url()).await.unwrap();
    assert!(relay.wait_for_connections(2, 2000).await);

    for i in 0..20 {
        a.send_text(&format!("msg-{}", i)).await;
    }

    for i in 0..20 {
        assert_eq!(
            b.recv_text(2000).await,
            Some(format!("msg-{}", i)),
            "Message {} out of order or missing",
            i
        );
    }
}
