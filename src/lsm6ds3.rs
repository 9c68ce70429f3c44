//! LSM6DS3 accelerometer and gyroscope over SPI.
//!
//! Both halves of the chip sit behind one [`Bus`]; each [`Sensor`] handle
//! locks it for the duration of a register access.

use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;
use ev3_uart_sensor::eeprom::CALIBRATION_SIZE;
use ev3_uart_sensor::imu::Sensor;

mod reg {
    pub const INT1_CTRL: u8 = 0x0D;
    pub const INT2_CTRL: u8 = 0x0E;
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL1_XL: u8 = 0x10;
    pub const CTRL2_G: u8 = 0x11;
    pub const CTRL4_C: u8 = 0x13;
    pub const OUTX_L_G: u8 = 0x22;
    pub const OUTX_L_XL: u8 = 0x28;
}

const DEVICE_ID: u8 = 0x69;
const READ: u8 = 0x80;
const ODR_416HZ: u8 = 0x60;
const SCALE_BITS: u8 = 0x0E;
/// CTRL4_C, hold data ready until the filters settle
const DRDY_MASK: u8 = 0x08;
const INT1_DRDY_XL: u8 = 0x01;
const INT2_DRDY_G: u8 = 0x02;

/// FS_XL field for 2g, 4g, 8g and 16g
const ACCEL_SCALES: [u8; 4] = [0x00, 0x08, 0x0C, 0x04];
/// FS_G and FS_125 fields for 245, 500, 1000, 2000 and 125 dps
const GYRO_SCALES: [u8; 5] = [0x00, 0x04, 0x08, 0x0C, 0x02];

pub struct Transport<SPI, CS> {
    spi: SPI,
    cs: CS,
}

pub type Bus<SPI, CS> = Mutex<RefCell<Option<Transport<SPI, CS>>>>;

impl<SPI, CS, E> Transport<SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin,
{
    pub fn new(spi: SPI, mut cs: CS) -> Self {
        let _ = cs.set_high();
        Self { spi, cs }
    }

    fn read(&mut self, reg: u8, out: &mut [u8]) -> Result<(), E> {
        let _ = self.cs.set_low();
        let res = self.spi.write(&[reg | READ]);
        let res = res.and_then(|()| {
            out.fill(0);
            self.spi.transfer(out).map(|_| ())
        });
        let _ = self.cs.set_high();
        res
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), E> {
        let _ = self.cs.set_low();
        let res = self.spi.write(&[reg & !READ, value]);
        let _ = self.cs.set_high();
        res
    }

    fn read_byte(&mut self, reg: u8) -> Result<u8, E> {
        let mut buf = [0];
        self.read(reg, &mut buf)?;
        Ok(buf[0])
    }

    fn modify(&mut self, reg: u8, mask: u8, bits: u8) -> Result<(), E> {
        let value = self.read_byte(reg)?;
        self.write(reg, value & !mask | bits & mask)
    }
}

/// Runs one register access with the bus locked. Failed transfers and a
/// bus that was never set up are logged under `what` and yield `None`.
fn with<SPI, CS, E, R>(
    bus: &Bus<SPI, CS>,
    what: &str,
    f: impl FnOnce(&mut Transport<SPI, CS>) -> Result<R, E>,
) -> Option<R> {
    match critical_section::with(|cs| bus.borrow_ref_mut(cs).as_mut().map(f)) {
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            ev3_uart_sensor::dbg::println!("lsm6ds3: {} failed", what);
            None
        }
        None => {
            ev3_uart_sensor::dbg::println!("lsm6ds3: {} without a bus", what);
            None
        }
    }
}

/// Calibration records are not persisted on this board, only checked.
fn check_calibration(what: &str, ranges: usize, scale: u8, data: &[u8]) {
    if scale as usize >= ranges || data.len() != CALIBRATION_SIZE {
        ev3_uart_sensor::dbg::println!("lsm6ds3: bad {} calibration for range {}", what, scale);
    } else {
        ev3_uart_sensor::dbg::println!("lsm6ds3: {} calibration for range {}", what, scale);
    }
}

pub struct Accelerometer<'a, SPI, CS> {
    bus: &'a Bus<SPI, CS>,
}

impl<'a, SPI, CS> Accelerometer<'a, SPI, CS> {
    pub fn new(bus: &'a Bus<SPI, CS>) -> Self {
        Self { bus }
    }
}

impl<SPI, CS, E> Sensor for Accelerometer<'_, SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin,
{
    fn init(&mut self) {
        with(self.bus, "accelerometer init", |t| {
            t.write(reg::CTRL4_C, DRDY_MASK)?;
            t.modify(reg::INT1_CTRL, INT1_DRDY_XL, INT1_DRDY_XL)?;
            t.write(reg::CTRL1_XL, ODR_416HZ | ACCEL_SCALES[0])
        });
    }

    fn reset(&mut self) {
        with(self.bus, "accelerometer reset", |t| {
            t.write(reg::CTRL1_XL, 0)?;
            t.modify(reg::INT1_CTRL, INT1_DRDY_XL, 0)
        });
    }

    fn set_scale(&mut self, scale: u8) {
        if let Some(&bits) = ACCEL_SCALES.get(scale as usize) {
            with(self.bus, "accelerometer scale", |t| {
                t.modify(reg::CTRL1_XL, SCALE_BITS, bits)
            });
        }
    }

    fn check_device(&mut self) -> bool {
        with(self.bus, "WHO_AM_I", |t| t.read_byte(reg::WHO_AM_I)) == Some(DEVICE_ID)
    }

    fn read_sample(&mut self, out: &mut [u8]) -> bool {
        with(self.bus, "accelerometer sample", |t| t.read(reg::OUTX_L_XL, out)).is_some()
    }

    fn update_eeprom(&mut self, scale: u8, data: &[u8]) {
        check_calibration("accelerometer", ACCEL_SCALES.len(), scale, data);
    }
}

pub struct Gyroscope<'a, SPI, CS> {
    bus: &'a Bus<SPI, CS>,
}

impl<'a, SPI, CS> Gyroscope<'a, SPI, CS> {
    pub fn new(bus: &'a Bus<SPI, CS>) -> Self {
        Self { bus }
    }
}

impl<SPI, CS, E> Sensor for Gyroscope<'_, SPI, CS>
where
    SPI: Transfer<u8, Error = E> + Write<u8, Error = E>,
    CS: OutputPin,
{
    fn init(&mut self) {
        with(self.bus, "gyroscope init", |t| {
            t.write(reg::CTRL4_C, DRDY_MASK)?;
            t.modify(reg::INT2_CTRL, INT2_DRDY_G, INT2_DRDY_G)?;
            t.write(reg::CTRL2_G, ODR_416HZ | GYRO_SCALES[0])
        });
    }

    fn reset(&mut self) {
        with(self.bus, "gyroscope reset", |t| {
            t.write(reg::CTRL2_G, 0)?;
            t.modify(reg::INT2_CTRL, INT2_DRDY_G, 0)
        });
    }

    fn set_scale(&mut self, scale: u8) {
        if let Some(&bits) = GYRO_SCALES.get(scale as usize) {
            with(self.bus, "gyroscope scale", |t| t.modify(reg::CTRL2_G, SCALE_BITS, bits));
        }
    }

    fn check_device(&mut self) -> bool {
        with(self.bus, "WHO_AM_I", |t| t.read_byte(reg::WHO_AM_I)) == Some(DEVICE_ID)
    }

    fn read_sample(&mut self, out: &mut [u8]) -> bool {
        with(self.bus, "gyroscope sample", |t| t.read(reg::OUTX_L_G, out)).is_some()
    }

    fn update_eeprom(&mut self, scale: u8, data: &[u8]) {
        check_calibration("gyroscope", GYRO_SCALES.len(), scale, data);
    }
}
