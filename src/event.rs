//! Byte encoded notifications multiplexed on one channel.
//!
//! Layout `KKKIIIII`: the kind in the three upper bits, a kind specific
//! info field in the five lower bits.
//!
//! | kind   | info                                   |
//! |--------|----------------------------------------|
//! | Data   | [`EventSource`] of the data ready line |
//! | Scale  | `DDSSS`, device and sensitivity range  |
//! | Mode   | mode number                            |
//! | Eeprom | `DDSSS`, device and calibration slot   |

use crate::queue::Channel;

pub const KIND_MASK: u8 = 0xE0;
pub const INFO_MASK: u8 = 0x1F;

/// Device bits of a scale or EEPROM info field
pub const DEVICE_MASK: u8 = 0x18;
/// Range bits of a scale or EEPROM info field
pub const SCALE_MASK: u8 = 0x07;

pub const EVENT_QUEUE_SIZE: usize = 32;

pub type EventChannel = Channel<Event, EVENT_QUEUE_SIZE>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Data = 0x00,
    Scale = 0x20,
    Mode = 0x40,
    Reset = 0x60,
    Start = 0x80,
    Stop = 0xA0,
    /// Reserved for host data requests, never produced.
    Request = 0xC0,
    Eeprom = 0xE0,
}

impl From<u8> for EventKind {
    fn from(v: u8) -> Self {
        use EventKind::*;
        match v & KIND_MASK {
            0x00 => Data,
            0x20 => Scale,
            0x40 => Mode,
            0x60 => Reset,
            0x80 => Start,
            0xA0 => Stop,
            0xC0 => Request,
            _ => Eeprom,
        }
    }
}

/// Origin of a data ready notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Gyroscope = 0,
    Accelerometer = 1,
    Magnetometer = 2,
}

impl TryFrom<u8> for EventSource {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(EventSource::Gyroscope),
            1 => Ok(EventSource::Accelerometer),
            2 => Ok(EventSource::Magnetometer),
            v => Err(v),
        }
    }
}

/// Sensor selected by the device bits of a scale or EEPROM info field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuDevice {
    Accelerometer = 0x00,
    Gyroscope = 0x08,
    Magnetometer = 0x10,
    Reserved = 0x18,
}

impl ImuDevice {
    pub fn from_info(info: u8) -> Self {
        match info & DEVICE_MASK {
            0x00 => ImuDevice::Accelerometer,
            0x08 => ImuDevice::Gyroscope,
            0x10 => ImuDevice::Magnetometer,
            _ => ImuDevice::Reserved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event(u8);

impl Event {
    pub const fn new(kind: EventKind, info: u8) -> Self {
        Event(kind as u8 | (info & INFO_MASK))
    }

    pub const fn data(source: EventSource) -> Self {
        Self::new(EventKind::Data, source as u8)
    }

    pub fn kind(self) -> EventKind {
        self.0.into()
    }

    pub const fn info(self) -> u8 {
        self.0 & INFO_MASK
    }

    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl From<u8> for Event {
    fn from(v: u8) -> Self {
        Event(v)
    }
}

impl From<Event> for u8 {
    fn from(e: Event) -> Self {
        e.0
    }
}
