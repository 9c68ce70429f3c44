use crate::device::Commands;
use crate::ev3::frame::ev3_speed;
use crate::ev3::{DataType, ModeSpec};

/// Sensor type id advertised to the host, from the third party range.
pub const TYPE_ID: u8 = 97;
/// Negotiated link speed, as the host's UART will actually produce it.
pub const SPEED: u32 = ev3_speed(115_200);

pub const ACCEL_SAMPLES: usize = 3;
pub const GYRO_SAMPLES: usize = 3;
pub const ACCEL_SAMPLE_SIZE: usize = ACCEL_SAMPLES * 2;
pub const GYRO_SAMPLE_SIZE: usize = GYRO_SAMPLES * 2;
pub const FULL_SAMPLE_SIZE: usize = ACCEL_SAMPLE_SIZE + GYRO_SAMPLE_SIZE;

const RANGE: (f32, f32) = (i16::MIN as f32, i16::MAX as f32);

pub const MODES: [ModeSpec; 3] = [
    ModeSpec {
        name: "IMU-ALL",
        sample_count: (ACCEL_SAMPLES + GYRO_SAMPLES) as u8,
        data_type: DataType::Int16,
        figures: 5,
        decimals: 0,
        view: true,
        raw: RANGE,
        si: RANGE,
        ..ModeSpec::DEFAULT
    },
    ModeSpec {
        name: "IMU-ACC",
        sample_count: ACCEL_SAMPLES as u8,
        data_type: DataType::Int16,
        figures: 5,
        decimals: 0,
        view: true,
        raw: RANGE,
        si: RANGE,
        ..ModeSpec::DEFAULT
    },
    ModeSpec {
        name: "IMU-RATE",
        sample_count: GYRO_SAMPLES as u8,
        data_type: DataType::Int16,
        figures: 5,
        decimals: 0,
        view: true,
        raw: RANGE,
        si: RANGE,
        ..ModeSpec::DEFAULT
    },
];

/// Host commands of the LSM6DS3 sensor
pub struct Lsm6ds3Commands;

impl Lsm6ds3Commands {
    pub const ACC_SCALE_2G: u8 = 0x20;
    pub const ACC_SCALE_16G: u8 = 0x23;
    pub const GYRO_SCALE_245DPS: u8 = 0x30;
    pub const GYRO_SCALE_125DPS: u8 = 0x34;

    pub const CALIBRATE_ACC_2G: u8 = 0x40;
    pub const CALIBRATE_GYRO_125DPS: u8 = 0x54;
}

impl Commands for Lsm6ds3Commands {
    const DEVICE_RESET: u8 = 0x11;

    fn is_scale_command(command: u8) -> bool {
        (Self::ACC_SCALE_2G..=Self::GYRO_SCALE_125DPS).contains(&command)
    }

    fn is_eeprom_command(command: u8) -> bool {
        (Self::CALIBRATE_ACC_2G..=Self::CALIBRATE_GYRO_125DPS).contains(&command)
    }

    fn scale_info(command: u8) -> u8 {
        Self::info(command, Self::ACC_SCALE_2G)
    }

    fn eeprom_info(command: u8) -> u8 {
        Self::info(command, Self::CALIBRATE_ACC_2G)
    }
}
