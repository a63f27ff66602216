pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Path the relay upgrades to a WebSocket.
pub const DEFAULT_WS_PATH: &str = "/api/ws";

/// Label of the data channel that carries chat text.
pub const CHAT_CHANNEL_LABEL: &str = "chat";
