//! Seams between the protocol session, the event dispatcher and the sensor.

use crate::eeprom::{EepromBuffer, CALIBRATION_SIZE};
use crate::ev3::frame::make_data;
use crate::ev3::MAX_PAYLOAD;
use crate::event::{Event, EventChannel, EventKind, EventSource, DEVICE_MASK, SCALE_MASK};
use crate::queue::Channel;
use crate::timer::Timer;
use crate::util::clp2;

/// Operations the session task requests from the device.
///
/// Implementations run on the session task and must return quickly; the
/// real work happens on the dispatch task.
pub trait Device {
    fn change_mode(&mut self, mode: u8);
    fn set_scale(&mut self, info: u8);
    fn reset(&mut self);
    fn start(&mut self);
    fn stop(&mut self);
    fn write_eeprom(&mut self, info: u8, data: &[u8]);
}

/// Device specific host commands carried by `WRITE` messages.
pub trait Commands {
    /// First payload byte that returns the device to its power on state
    const DEVICE_RESET: u8;

    fn is_scale_command(command: u8) -> bool;
    fn is_eeprom_command(command: u8) -> bool;
    fn scale_info(command: u8) -> u8;
    fn eeprom_info(command: u8) -> u8;

    /// Packs the high nibble of `command`, relative to `offset`, into the
    /// device bits and keeps the range bits.
    fn info(command: u8, offset: u8) -> u8 {
        (command.wrapping_sub(offset) >> 1) & DEVICE_MASK | command & SCALE_MASK
    }

    /// Routes a `WRITE` payload. The first byte is the host command, the
    /// rest is the command argument.
    fn handle_command<D: Device + ?Sized>(device: &mut D, payload: &[u8]) {
        let Some((&command, data)) = payload.split_first() else {
            return;
        };
        if Self::is_scale_command(command) {
            device.set_scale(Self::scale_info(command));
        } else if Self::is_eeprom_command(command) {
            device.write_eeprom(Self::eeprom_info(command), data);
        }
    }
}

/// Sensor logic driven by the dispatch task.
pub trait DeviceCore {
    fn set_mode(&mut self, mode: u8);
    fn set_scale(&mut self, info: u8);
    fn reset(&mut self);
    fn start(&mut self);
    fn stop(&mut self);
    /// Data ready on `source`. Complete samples go to `sink`.
    fn handle_event(&mut self, source: EventSource, sink: &SampleSink);
    fn update_eeprom(&mut self, info: u8, data: &[u8]);
}

/// [`Device`] that forwards every request to the dispatch task as an event.
pub struct EventSender<'a, W> {
    events: &'a EventChannel,
    eeprom: &'a EepromBuffer<CALIBRATION_SIZE>,
    timer: W,
    notify: fn(),
}

impl<'a, W: Timer> EventSender<'a, W> {
    pub fn new(
        events: &'a EventChannel,
        eeprom: &'a EepromBuffer<CALIBRATION_SIZE>,
        timer: W,
    ) -> Self {
        Self {
            events,
            eeprom,
            timer,
            notify: || {},
        }
    }

    /// Called after every queued event, typically to wake the dispatch task.
    pub fn with_notify(mut self, notify: fn()) -> Self {
        self.notify = notify;
        self
    }

    fn push(&mut self, kind: EventKind, info: u8) {
        // Unbounded wait, the dispatcher always drains the queue.
        let _ = self
            .events
            .send(Event::new(kind, info), &mut self.timer, None);
        (self.notify)();
    }
}

impl<'a, W: Timer> Device for EventSender<'a, W> {
    fn change_mode(&mut self, mode: u8) {
        self.push(EventKind::Mode, mode);
    }

    fn set_scale(&mut self, info: u8) {
        self.push(EventKind::Scale, info);
    }

    fn reset(&mut self) {
        self.push(EventKind::Reset, 0);
    }

    fn start(&mut self) {
        self.push(EventKind::Start, 0);
    }

    fn stop(&mut self) {
        self.push(EventKind::Stop, 0);
    }

    fn write_eeprom(&mut self, info: u8, data: &[u8]) {
        self.eeprom.write(data);
        self.push(EventKind::Eeprom, info);
    }
}

pub const SAMPLE_BUFFER_SIZE: usize = MAX_PAYLOAD + 2;
pub const SAMPLE_QUEUE_SIZE: usize = 4;

pub type SampleChannel = Channel<Sample, SAMPLE_QUEUE_SIZE>;

/// One `DATA` message waiting for transmission.
///
/// `data[0]` is reserved for the frame byte, the payload follows and is
/// padded with zeros to a power of two, the checksum goes after it.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub mode: u8,
    pub len: usize,
    pub data: [u8; SAMPLE_BUFFER_SIZE],
}

impl Sample {
    /// `None` when `payload` is longer than [`MAX_PAYLOAD`].
    pub fn new(mode: u8, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_PAYLOAD {
            return None;
        }
        let len = clp2(payload.len());
        let mut data = [0u8; SAMPLE_BUFFER_SIZE];
        data[1..=payload.len()].copy_from_slice(payload);
        Some(Self { mode, len, data })
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[1..=self.len]
    }

    pub fn frame_byte(&self) -> u8 {
        make_data(self.mode, self.len)
    }
}

/// Dispatch side of the sample queue. Never blocks; a sample that does not
/// fit is discarded and counted.
#[derive(Clone, Copy)]
pub struct SampleSink<'a> {
    samples: &'a SampleChannel,
}

impl<'a> SampleSink<'a> {
    pub fn new(samples: &'a SampleChannel) -> Self {
        Self { samples }
    }

    pub fn send(&self, mode: u8, payload: &[u8]) -> bool {
        match Sample::new(mode, payload) {
            Some(sample) => self.samples.try_send(sample).is_ok(),
            None => false,
        }
    }

    pub fn dropped(&self) -> u32 {
        self.samples.dropped()
    }
}
