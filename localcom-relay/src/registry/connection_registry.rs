use axum::extract::ws::Message;
use dashmap::DashMap;
use localcom_core::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Recipients whose outbound queue was full.
    pub dropped: usize,
    /// Recipients whose writer had already gone away; they are deregistered.
    pub closed: usize,
}

/// The set of open relay connections, keyed by connection identity.
///
/// Each entry is the bounded queue feeding that connection's writer task, so
/// a broadcast never waits on a socket.
#[derive(Default)]
pub struct ConnectionRegistry {
    peers: DashMap<ConnectionId, mpsc::Sender<Message>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns the new total.
    pub fn insert(&self, id: ConnectionId, tx: mpsc::Sender<Message>) -> usize {
        self.peers.insert(id, tx);
        self.peers.len()
    }

    /// Deregisters a connection and returns the remaining total.
    pub fn remove(&self, id: &ConnectionId) -> usize {
        self.peers.remove(id);
        self.peers.len()
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Queues `msg` for every registered connection except `from`.
    pub fn broadcast(&self, from: &ConnectionId, msg: Message) -> BroadcastReport {
        // Snapshot first so no map guard is held while sending.
        let targets: Vec<(ConnectionId, mpsc::Sender<Message>)> = self
            .peers
            .iter()
            .filter(|entry| entry.key() != from)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut report = BroadcastReport::default();

        for (id, tx) in targets {
            match tx.try_send(msg.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Outbound queue full for {}, dropping message", id);
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Connection {} already closed, deregistering", id);
                    self.peers.remove(&id);
                    report.closed += 1;
                }
            }
        }

        report
    }
}
