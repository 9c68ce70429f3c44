//! Device side of the EV3 UART sensor protocol.

pub mod command;
pub mod constants;
pub mod descriptor;
pub mod frame;
pub mod session;
mod types;

pub use constants::*;
pub use descriptor::{Descriptor, DescriptorError, ModeSpec};
pub use session::Session;
pub use types::*;
