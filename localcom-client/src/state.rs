use std::fmt;

/// Relay link status, shown to the user as the connectivity indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Peer-to-peer call phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Calling,
    InCall,
}

/// What moves a call from one phase to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTrigger {
    /// Local user starts a call.
    Dial,
    /// An inbound offer is taken on.
    OfferAccepted,
    /// The transport delivered an inbound media stream.
    MediaFlowing,
    /// Hang-up, link loss, or a failed setup.
    Teardown,
}

impl CallState {
    /// Next phase, or `None` when the trigger does not apply in this phase.
    pub fn on(self, trigger: CallTrigger) -> Option<CallState> {
        use CallState::*;
        use CallTrigger::*;

        match (self, trigger) {
            (Idle, Dial) | (Idle, OfferAccepted) => Some(Calling),
            (Calling, MediaFlowing) => Some(InCall),
            (_, Teardown) => Some(Idle),
            _ => None,
        }
    }

    pub fn is_idle(self) -> bool {
        self == CallState::Idle
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(s)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Calling => "calling",
            Self::InCall => "in-call",
        };
        f.write_str(s)
    }
}
