use crate::backend::{ChannelState, DataChannel, MediaBackend};
use crate::error::ClientResult;
use crate::event::{Command, ControllerUpdate, EngineEvent, Notice, SessionId};
use crate::handle::ControllerHandle;
use crate::link::SignalSink;
use crate::state::{CallState, CallTrigger, LinkState};
use crate::store::ChatStore;
use localcom_core::utils::CHAT_CHANNEL_LABEL;
use localcom_core::{ChatRecord, RecordClock};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod chat_impl;
mod handle_event_impl;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod hang_up_impl;
mod session;
mod start_call_impl;

pub use session::SessionRole;
use session::Session;

const COMMAND_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Label of the data channel the caller opens for chat.
    pub chat_label: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            chat_label: CHAT_CHANNEL_LABEL.to_owned(),
        }
    }
}

/// Negotiation controller: owns the relay link state, at most one call
/// session and the chat history.
///
/// All transitions happen on `&mut self`, one event or command at a time.
/// Runtime callbacks reach it only through the [`EngineEvent`] channel whose
/// sender is passed to [`Controller::new`].
pub struct Controller {
    config: ControllerConfig,
    backend: Arc<dyn MediaBackend>,
    store: Arc<dyn ChatStore>,
    signal: Arc<dyn SignalSink>,

    link: LinkState,
    call: CallState,
    session: Option<Session>,
    next_session: u64,
    chat_available: bool,

    history: Vec<ChatRecord>,
    clock: RecordClock,

    events_tx: mpsc::UnboundedSender<EngineEvent>,
    updates: mpsc::UnboundedSender<ControllerUpdate>,
}

impl Controller {
    pub fn new(
        config: ControllerConfig,
        backend: Arc<dyn MediaBackend>,
        store: Arc<dyn ChatStore>,
        signal: Arc<dyn SignalSink>,
        events_tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerUpdate>) {
        let (updates, updates_rx) = mpsc::unbounded_channel();

        let controller = Self {
            config,
            backend,
            store,
            signal,
            link: LinkState::Disconnected,
            call: CallState::Idle,
            session: None,
            next_session: 0,
            chat_available: false,
            history: Vec::new(),
            clock: RecordClock::new(),
            events_tx,
            updates,
        };
        (controller, updates_rx)
    }

    /// Reads the stored history once and publishes it.
    pub async fn load_history(&mut self) -> ClientResult<()> {
        let records = self.store.read_all().await?;
        if let Some(last) = records.iter().map(|r| r.id).max() {
            self.clock = RecordClock::resume_after(last);
        }

        info!("Loaded {} chat records", records.len());
        self.history = records.clone();
        self.publish(ControllerUpdate::History(records));
        Ok(())
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn call_state(&self) -> CallState {
        self.call
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn session_role(&self) -> Option<SessionRole> {
        self.session.as_ref().map(|s| s.role)
    }

    /// Remote stream currently feeding the playback sink.
    pub fn remote_audio(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.remote_audio.as_deref())
    }

    pub fn chat_available(&self) -> bool {
        self.open_channel().is_some()
    }

    pub fn history(&self) -> &[ChatRecord] {
        &self.history
    }

    /// Runs the controller until [`Command::Shutdown`] or until every handle
    /// is dropped. Any live session is torn down on exit.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<EngineEvent>,
    ) {
        info!("Controller event loop started");

        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(Command::Shutdown) | None => {
                            info!("Controller shutting down");
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                    }
                }

                evt = events.recv() => {
                    match evt {
                        Some(e) => self.handle_event(e).await,
                        None => {
                            warn!("Engine event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        self.hang_up().await;
        info!("Controller event loop finished");
    }

    /// Moves the controller onto its own task.
    pub fn spawn(self, events: mpsc::UnboundedReceiver<EngineEvent>) -> ControllerHandle {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        tokio::spawn(self.run(rx, events));
        ControllerHandle::new(tx)
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::StartCall { reply } => {
                let _ = reply.send(self.start_call().await);
            }
            Command::HangUp { reply } => {
                self.hang_up().await;
                let _ = reply.send(());
            }
            Command::SendChat { text, reply } => {
                let _ = reply.send(self.send_chat(&text).await);
            }
            Command::Shutdown => {}
        }
    }

    /// Applies `trigger` to the call phase. Returns false when it does not
    /// apply in the current phase.
    fn transition(&mut self, trigger: CallTrigger) -> bool {
        let Some(next) = self.call.on(trigger) else {
            return false;
        };

        if next != self.call {
            info!("Call state: {} -> {}", self.call, next);
            self.call = next;
            self.publish(ControllerUpdate::Call(next));
        }
        true
    }

    fn set_link(&mut self, state: LinkState) {
        if state != self.link {
            info!("Relay link: {}", state);
            self.link = state;
            self.publish(ControllerUpdate::Link(state));
        }
    }

    fn allocate_session_id(&mut self) -> SessionId {
        self.next_session += 1;
        SessionId(self.next_session)
    }

    fn open_channel(&self) -> Option<Arc<dyn DataChannel>> {
        self.session
            .as_ref()
            .and_then(|s| s.channel.clone())
            .filter(|c| c.state() == ChannelState::Open)
    }

    /// Publishes chat availability when it differs from what was last told.
    fn refresh_chat_available(&mut self) {
        let open = self.chat_available();
        if open != self.chat_available {
            self.chat_available = open;
            self.publish(ControllerUpdate::ChatAvailable(open));
        }
    }

    fn notify(&self, notice: Notice) {
        warn!("{}", notice);
        self.publish(ControllerUpdate::Notice(notice));
    }

    fn publish(&self, update: ControllerUpdate) {
        let _ = self.updates.send(update);
    }
}
