/// Failure of a single host exchange. Every kind makes the session restart
/// the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Checksum mismatch
    CrcError,
    /// A byte did not arrive in time
    Timeout,
    /// Declared payload does not fit the command buffer
    FormatError,
    /// Well formed byte that the protocol does not allow here
    NotExpectedCommand,
}

pub type Result<T> = core::result::Result<T, Error>;

/// Session state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    Reset,
    Init,
    WaitingForAck,
    SetSpeed,
    WaitingForCommand,
}

/// Message class, two upper bits of the frame byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Sys = 0x00,
    Cmd = 0x40,
    Info = 0x80,
    Data = 0xC0,
}

impl From<MessageClass> for u8 {
    fn from(val: MessageClass) -> Self {
        val as u8
    }
}

impl From<u8> for MessageClass {
    fn from(v: u8) -> Self {
        use MessageClass::*;
        match v & super::MESSAGE_MASK {
            0x00 => Sys,
            0x40 => Cmd,
            0x80 => Info,
            _ => Data,
        }
    }
}

/// Data set format of a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8 = 0,
    Int16 = 1,
    Int32 = 2,
    Float = 3,
}

impl DataType {
    pub const fn size(self) -> usize {
        match self {
            DataType::Int8 => 1,
            DataType::Int16 => 2,
            DataType::Int32 | DataType::Float => 4,
        }
    }
}

impl From<DataType> for u8 {
    fn from(val: DataType) -> Self {
        val as u8
    }
}

impl TryFrom<u8> for DataType {
    type Error = u8;

    fn try_from(v: u8) -> core::result::Result<Self, Self::Error> {
        use DataType::*;
        match v {
            0 => Ok(Int8),
            1 => Ok(Int16),
            2 => Ok(Int32),
            3 => Ok(Float),
            v => Err(v),
        }
    }
}
