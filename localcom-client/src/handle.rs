use crate::error::{ClientError, ClientResult};
use crate::event::Command;
use localcom_core::ChatRecord;
use tokio::sync::{mpsc, oneshot};

/// Cloneable front of a controller running on its own task.
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
}

impl ControllerHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>) -> Self {
        Self { commands }
    }

    pub async fn start_call(&self) -> ClientResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::StartCall { reply }).await?;
        rx.await.map_err(|_| ClientError::ControllerGone)?
    }

    pub async fn hang_up(&self) -> ClientResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::HangUp { reply }).await?;
        rx.await.map_err(|_| ClientError::ControllerGone)
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> ClientResult<ChatRecord> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SendChat {
            text: text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| ClientError::ControllerGone)?
    }

    /// Asks the controller to hang up and stop. Returns immediately.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, cmd: Command) -> ClientResult<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ClientError::ControllerGone)
    }
}
