//! Frame byte layout `CCLLLXXX` and the message checksum.
//!
//! `CC` is the message class, `LLL` the base-2 logarithm of the payload
//! length and `XXX` the command id or mode number.

use super::constants::*;
use super::types::MessageClass;
use crate::util;

#[inline(always)]
pub fn message_class(byte: u8) -> MessageClass {
    byte.into()
}

#[inline(always)]
pub fn command_id(byte: u8) -> u8 {
    byte & 0x07
}

/// Payload length declared by a frame byte. Selectors above 5 are
/// representable on the wire but exceed [`MAX_PAYLOAD`].
#[inline(always)]
pub fn payload_length(byte: u8) -> usize {
    1 << ((byte >> 3) & 0x07)
}

/// Composes a frame byte. `length` must be a power of two up to
/// [`MAX_PAYLOAD`].
pub const fn make_frame(class: MessageClass, length: usize, content: u8) -> u8 {
    assert!(
        util::is_pow2(length) && length <= MAX_PAYLOAD,
        "length must be a power of 2"
    );
    class as u8 | (content & 0x07) | ((util::log2(length) & 0x07) << 3)
}

pub const fn make_command(command: u8, length: usize) -> u8 {
    make_frame(MessageClass::Cmd, length, command)
}

pub const fn make_info(mode: u8, length: usize) -> u8 {
    make_frame(MessageClass::Info, length, mode)
}

pub const fn make_data(mode: u8, length: usize) -> u8 {
    make_frame(MessageClass::Data, length, mode)
}

/// Folds XOR over `data` starting from `seed`.
pub fn checksum_with(seed: u8, data: &[u8]) -> u8 {
    data.iter().fold(seed, |acc, &val| acc ^ val)
}

/// Checksum of a message, seeded with [`CHECKSUM_SEED`].
pub fn checksum(data: &[u8]) -> u8 {
    checksum_with(CHECKSUM_SEED, data)
}

/// Baud rate the host actually produces when asked for `reference`.
pub const fn ev3_speed(reference: u32) -> u32 {
    let prescaler = HOST_UART_CLOCK / reference / HOST_UART_OVERSAMPLING;
    HOST_UART_CLOCK / prescaler / HOST_UART_OVERSAMPLING
}
