pub use localcom_core::{ChatRecord, ChatSender, SignalMessage};

pub mod model {
    pub use localcom_core::model::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use localcom_relay::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use localcom_client::*;
}
