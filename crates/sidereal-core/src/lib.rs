pub mod constants;
pub mod encoder;
pub mod error;
pub mod protocol;
pub mod types;

pub use constants::*;
pub use error::SiderealError;
pub use protocol::{ProtocolParameters, ProtocolRegistry, ProtocolVersion};
pub use types::*;
