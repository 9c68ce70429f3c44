use crate::timer::Duration;

/// System message bytes
pub const SYNC: u8 = 0x00;
pub const NACK: u8 = 0x02;
pub const ACK: u8 = 0x04;

/// Message class, two upper bits of the frame byte
pub const MESSAGE_SYS: u8 = 0x00;
pub const MESSAGE_CMD: u8 = 0x40;
pub const MESSAGE_INFO: u8 = 0x80;
pub const MESSAGE_DATA: u8 = 0xC0;
pub const MESSAGE_MASK: u8 = 0xC0;

/// Command ids, three lower bits of a CMD frame byte
pub const CMD_TYPE: u8 = 0x00;
pub const CMD_MODES: u8 = 0x01;
pub const CMD_SPEED: u8 = 0x02;
pub const CMD_SELECT: u8 = 0x03;
pub const CMD_WRITE: u8 = 0x04;

/// Fixed length commands, precomputed frame bytes
pub const FRAME_TYPE: u8 = 0x40;
pub const FRAME_SELECT: u8 = 0x43;
pub const FRAME_MODES: u8 = 0x49;
pub const FRAME_SPEED: u8 = 0x52;

/// Second byte of an INFO message
pub const INFO_NAME: u8 = 0x00;
pub const INFO_RAW: u8 = 0x01;
pub const INFO_PCT: u8 = 0x02;
pub const INFO_SI: u8 = 0x03;
pub const INFO_SYMBOL: u8 = 0x04;
pub const INFO_FORMAT: u8 = 0x80;

/// Checksum seed
pub const CHECKSUM_SEED: u8 = 0xFF;

/// Largest payload of a single message
pub const MAX_PAYLOAD: usize = 32;
/// Largest number of modes a device may advertise
pub const MAX_MODES: usize = 8;

/// Baud rate used for the capability advertisement
pub const INITIAL_BAUDRATE: u32 = 2400;

/// Wait for the host ACK after the advertisement. Sending a full 32 byte
/// buffer takes about 106 ms, hosts ack after 150 to 170 ms.
pub const ACK_TIMEOUT: Duration = Duration::millis(256);
/// Longest silence tolerated between host commands
pub const HEARTBEAT_TIMEOUT: Duration = Duration::millis(1000);
/// Settle time after power on
pub const COLD_START_DELAY: Duration = Duration::millis(500);
/// Settle time after a protocol failure, the host needs at least 100 ms
pub const RESET_DELAY: Duration = Duration::millis(110);
/// Time for the host to switch to the negotiated speed
pub const SET_SPEED_DELAY: Duration = Duration::millis(10);

/// Clock of the host UART and its oversampling factor
pub const HOST_UART_CLOCK: u32 = 132_000_000;
pub const HOST_UART_OVERSAMPLING: u32 = 16;
