use crate::integration::init_tracing;
use crate::utils::{TestClient, TestRelay};

#[tokio::test]
async fn test_other_path_refused() {
    init_tracing();

    let relay = TestRelay::start().await;

    for path in ["/", "/ws", "/api/ws/extra", "/api/wss"] {
        let result = TestClient::connect(&relay.url_for(path)).await;
        assert!(result.is_err(), "Upgrade on {} should be refused", path);
    }

    assert_eq!(relay.service.connection_count(), 0);
}
