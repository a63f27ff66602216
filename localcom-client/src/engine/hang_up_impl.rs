use super::Controller;
use crate::state::CallTrigger;
use tracing::info;

impl Controller {
    /// Tears down the session, whatever phase it is in. A no-op when idle.
    pub async fn hang_up(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Hanging up session {}", session.id);
            session.close().await;
        }

        self.transition(CallTrigger::Teardown);
        self.refresh_chat_available();
    }
}
