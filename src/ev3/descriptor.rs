//! Capability advertisement sent to the host during the handshake.
//!
//! Layout: `TYPE`, `MODES`, `SPEED`, then one info block per mode with the
//! highest mode first (`NAME`, `RAW`, optional `PCT`, `SI`, optional
//! `SYMBOL`, `FORMAT`) and a trailing `ACK`. Every message carries its own
//! checksum.

use super::frame::{checksum, make_info};
use super::{
    DataType, ACK, FRAME_MODES, FRAME_SPEED, FRAME_TYPE, INFO_FORMAT, INFO_NAME, INFO_PCT, INFO_RAW,
    INFO_SI, INFO_SYMBOL, MAX_MODES, MAX_PAYLOAD,
};
use crate::util::clp2;
use heapless::Vec;

pub const DESCRIPTOR_CAPACITY: usize = 768;
pub const MAX_NAME_LENGTH: usize = 11;
pub const MAX_SYMBOL_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorError {
    TooManyModes,
    NoModes,
    /// Mode 0 at least must be visible
    NoViews,
    NameTooLong,
    SymbolTooLong,
    EmptyName,
    /// Sample set is empty or larger than one message
    BadSampleCount,
    Overflow,
}

/// Static description of one sensor mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSpec {
    pub name: &'static str,
    pub sample_count: u8,
    pub data_type: DataType,
    pub figures: u8,
    pub decimals: u8,
    /// Listed in the brick's view and data log menus
    pub view: bool,
    pub raw: (f32, f32),
    pub pct: Option<(f32, f32)>,
    pub si: (f32, f32),
    pub symbol: Option<&'static str>,
}

impl ModeSpec {
    /// Host side defaults, meant for struct update syntax.
    pub const DEFAULT: ModeSpec = ModeSpec {
        name: "",
        sample_count: 1,
        data_type: DataType::Int8,
        figures: 4,
        decimals: 0,
        view: true,
        raw: (0.0, 1023.0),
        pct: None,
        si: (0.0, 1.0),
        symbol: None,
    };

    pub const fn sample_size(&self) -> usize {
        self.sample_count as usize * self.data_type.size()
    }
}

/// Immutable advertisement bytes, built once at start up.
#[derive(Debug, Clone)]
pub struct Descriptor {
    data: Vec<u8, DESCRIPTOR_CAPACITY>,
}

impl Descriptor {
    pub fn build(type_id: u8, speed: u32, modes: &[ModeSpec]) -> Result<Self, DescriptorError> {
        if modes.is_empty() {
            return Err(DescriptorError::NoModes);
        }
        if modes.len() > MAX_MODES {
            return Err(DescriptorError::TooManyModes);
        }
        let views = modes.iter().filter(|m| m.view).count();
        if views == 0 {
            return Err(DescriptorError::NoViews);
        }

        let mut writer = Writer::default();
        writer.message(&[FRAME_TYPE, type_id])?;
        writer.message(&[FRAME_MODES, modes.len() as u8 - 1, views as u8 - 1])?;
        let mut speed_msg = [FRAME_SPEED, 0, 0, 0, 0];
        speed_msg[1..].copy_from_slice(&speed.to_le_bytes());
        writer.message(&speed_msg)?;

        for (index, mode) in modes.iter().enumerate().rev() {
            writer.mode(index as u8, mode)?;
        }
        writer.push(ACK)?;

        Ok(Self { data: writer.data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for Descriptor {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[derive(Default)]
struct Writer {
    data: Vec<u8, DESCRIPTOR_CAPACITY>,
}

impl Writer {
    fn push(&mut self, byte: u8) -> Result<(), DescriptorError> {
        self.data.push(byte).map_err(|_| DescriptorError::Overflow)
    }

    fn extend(&mut self, bytes: &[u8]) -> Result<(), DescriptorError> {
        self.data
            .extend_from_slice(bytes)
            .map_err(|_| DescriptorError::Overflow)
    }

    /// Appends `msg` followed by its checksum.
    fn message(&mut self, msg: &[u8]) -> Result<(), DescriptorError> {
        self.extend(msg)?;
        self.push(checksum(msg))
    }

    /// INFO message whose payload is `content` zero padded to a power of two.
    fn info(&mut self, mode: u8, info: u8, content: &[u8]) -> Result<(), DescriptorError> {
        let mut msg = [0u8; MAX_PAYLOAD + 2];
        let len = clp2(content.len());
        msg[0] = make_info(mode, len);
        msg[1] = info;
        msg[2..2 + content.len()].copy_from_slice(content);
        self.message(&msg[..2 + len])
    }

    fn range(&mut self, mode: u8, info: u8, (min, max): (f32, f32)) -> Result<(), DescriptorError> {
        let mut content = [0u8; 8];
        content[..4].copy_from_slice(&min.to_le_bytes());
        content[4..].copy_from_slice(&max.to_le_bytes());
        self.info(mode, info, &content)
    }

    fn mode(&mut self, index: u8, mode: &ModeSpec) -> Result<(), DescriptorError> {
        let name = mode.name.as_bytes();
        if name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(DescriptorError::NameTooLong);
        }
        if mode.sample_count == 0 || mode.sample_size() > MAX_PAYLOAD {
            return Err(DescriptorError::BadSampleCount);
        }

        self.info(index, INFO_NAME, name)?;
        self.range(index, INFO_RAW, mode.raw)?;
        if let Some(pct) = mode.pct {
            self.range(index, INFO_PCT, pct)?;
        }
        self.range(index, INFO_SI, mode.si)?;
        if let Some(symbol) = mode.symbol {
            if symbol.len() > MAX_SYMBOL_LENGTH {
                return Err(DescriptorError::SymbolTooLong);
            }
            self.info(index, INFO_SYMBOL, symbol.as_bytes())?;
        }
        self.info(
            index,
            INFO_FORMAT,
            &[
                mode.sample_count,
                mode.data_type.into(),
                mode.figures,
                mode.decimals,
            ],
        )
    }
}
