//! Accelerometer and gyroscope pair served as a three mode EV3 sensor.

mod commands;

pub use commands::*;

use crate::device::{DeviceCore, SampleSink};
use crate::event::{EventSource, ImuDevice, SCALE_MASK};

/// Register level driver of one inertial sensor.
pub trait Sensor {
    /// Powers up at the default range with the data ready interrupt enabled.
    fn init(&mut self);
    /// Powers down and disables the data ready interrupt.
    fn reset(&mut self);
    fn set_scale(&mut self, scale: u8);
    /// Reads the identification register.
    fn check_device(&mut self) -> bool;
    /// Reads one sample, three little endian `i16` axes. Returns `false`
    /// when the transfer failed and `out` holds no valid data.
    fn read_sample(&mut self, out: &mut [u8]) -> bool;
    /// Receives calibration data for `scale`.
    fn update_eeprom(&mut self, scale: u8, data: &[u8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuState {
    Init,
    Both,
    Accelerometer,
    Gyroscope,
}

impl ImuState {
    /// Unknown modes fall back to the combined one.
    fn from_mode(mode: u8) -> Self {
        match mode {
            1 => ImuState::Accelerometer,
            2 => ImuState::Gyroscope,
            _ => ImuState::Both,
        }
    }

    fn mode(self) -> u8 {
        match self {
            ImuState::Init | ImuState::Both => 0,
            ImuState::Accelerometer => 1,
            ImuState::Gyroscope => 2,
        }
    }
}

/// The gyroscope sample always lands right after the accelerometer one, so
/// switching between modes never mixes halves of different layouts.
pub struct ImuCore<A, G> {
    accel: A,
    gyro: G,
    state: ImuState,
    buffer: [u8; FULL_SAMPLE_SIZE],
    /// Cleared while the accelerometer half of `buffer` comes from a failed read.
    accel_valid: bool,
}

impl<A: Sensor, G: Sensor> ImuCore<A, G> {
    pub fn new(accel: A, gyro: G) -> Self {
        Self {
            accel,
            gyro,
            state: ImuState::Init,
            buffer: [0; FULL_SAMPLE_SIZE],
            accel_valid: true,
        }
    }

    pub fn state(&self) -> ImuState {
        self.state
    }

    pub fn sensors(&mut self) -> (&mut A, &mut G) {
        (&mut self.accel, &mut self.gyro)
    }

    fn accel_active(&self) -> bool {
        matches!(self.state, ImuState::Both | ImuState::Accelerometer)
    }

    fn gyro_active(&self) -> bool {
        matches!(self.state, ImuState::Both | ImuState::Gyroscope)
    }
}

impl<A: Sensor, G: Sensor> DeviceCore for ImuCore<A, G> {
    fn set_mode(&mut self, mode: u8) {
        let state = ImuState::from_mode(mode);
        if state == self.state {
            return;
        }
        self.state = state;
        match state {
            ImuState::Both => {
                self.gyro.init();
                self.accel.init();
            }
            ImuState::Accelerometer => {
                self.gyro.reset();
                self.accel.init();
            }
            ImuState::Gyroscope => {
                self.gyro.init();
                self.accel.reset();
            }
            ImuState::Init => {}
        }
    }

    fn set_scale(&mut self, info: u8) {
        let scale = info & SCALE_MASK;
        match ImuDevice::from_info(info) {
            ImuDevice::Gyroscope if self.gyro_active() => self.gyro.set_scale(scale),
            ImuDevice::Accelerometer if self.accel_active() => self.accel.set_scale(scale),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.set_mode(0);
    }

    fn start(&mut self) {
        if self.gyro.check_device() {
            self.set_mode(0);
        } else {
            crate::dbg::println!("imu: sensor not found");
        }
    }

    fn stop(&mut self) {
        self.accel.reset();
        self.gyro.reset();
        self.state = ImuState::Init;
    }

    fn handle_event(&mut self, source: EventSource, sink: &SampleSink) {
        let mode = self.state.mode();
        let (accel, gyro) = self.buffer.split_at_mut(ACCEL_SAMPLE_SIZE);
        match (self.state, source) {
            (ImuState::Both, EventSource::Accelerometer) => {
                self.accel_valid = self.accel.read_sample(accel);
            }
            // The gyroscope fires after the accelerometer and completes the pair.
            (ImuState::Both, EventSource::Gyroscope) => {
                if self.gyro.read_sample(gyro) && self.accel_valid {
                    sink.send(mode, &self.buffer);
                }
            }
            (ImuState::Accelerometer, EventSource::Accelerometer) => {
                if self.accel.read_sample(accel) {
                    sink.send(mode, accel);
                }
            }
            (ImuState::Gyroscope, EventSource::Gyroscope) => {
                if self.gyro.read_sample(gyro) {
                    sink.send(mode, gyro);
                }
            }
            _ => {}
        }
    }

    fn update_eeprom(&mut self, info: u8, data: &[u8]) {
        let scale = info & SCALE_MASK;
        match ImuDevice::from_info(info) {
            ImuDevice::Gyroscope => self.gyro.update_eeprom(scale, data),
            ImuDevice::Accelerometer => self.accel.update_eeprom(scale, data),
            _ => {}
        }
    }
}
