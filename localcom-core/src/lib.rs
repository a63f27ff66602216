mod error;
pub mod model;
pub mod utils;

pub use error::ProtocolError;
pub use model::*;
