#![cfg_attr(not(test), no_std)]

#[cfg(feature = "HALT")]
pub use panic_halt as _;
#[cfg(feature = "RTT")]
pub use panic_probe as _;
#[cfg(feature = "QEMU")]
pub use panic_semihosting as _;

pub mod dbg;
pub mod device;
pub mod dispatch;
pub mod eeprom;
pub mod event;
pub mod ev3;
pub mod imu;
pub mod link;
pub mod queue;
pub mod timer;
pub mod util;

#[cfg(test)]
pub(crate) mod mock;
