//! Connection lifecycle with the EV3 host.

use super::command::read_command;
use super::frame::{checksum, make_data, message_class, payload_length};
use super::*;
use crate::device::{Commands, Device, SampleChannel};
use crate::link::{get_byte, Link};
use crate::timer::{Timeout, Timer};
use crate::util::is_pow2;
use core::marker::PhantomData;

/// Handshake and command loop. [`Session::process`] runs one step of the
/// state machine and is meant to be called forever from the session task.
///
/// Any failure once the host acknowledged the advertisement stops the
/// device and restarts the handshake; nothing is fatal.
pub struct Session<'a, L, T, D, C> {
    state: State,
    link: L,
    timer: T,
    device: D,
    descriptor: &'a [u8],
    speed: u32,
    samples: &'a SampleChannel,
    _commands: PhantomData<C>,
}

impl<'a, L, T, D, C> Session<'a, L, T, D, C>
where
    L: Link,
    T: Timer,
    D: Device,
    C: Commands,
{
    /// `descriptor` is sent verbatim on every handshake; `speed` is the baud
    /// rate it advertises.
    pub fn new(
        link: L,
        timer: T,
        device: D,
        descriptor: &'a [u8],
        speed: u32,
        samples: &'a SampleChannel,
    ) -> Self {
        Self {
            state: State::Start,
            link,
            timer,
            device,
            descriptor,
            speed,
            samples,
            _commands: PhantomData,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn link(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn device(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn process(&mut self) {
        let prev = self.state;
        let next = match prev {
            State::Start => {
                self.link.reset();
                self.timer.delay(COLD_START_DELAY);
                State::Init
            }
            State::Reset => {
                self.link.reset();
                self.timer.delay(RESET_DELAY);
                State::Init
            }
            State::Init => {
                self.samples.clear();
                self.link.configure(INITIAL_BAUDRATE);
                self.link.start();
                self.link.send_data(self.descriptor);
                State::WaitingForAck
            }
            State::WaitingForAck => match get_byte(&mut self.link, &mut self.timer, ACK_TIMEOUT) {
                Ok(ACK) => State::SetSpeed,
                Ok(byte) => {
                    crate::dbg::println!("ev3: expected ACK, got {:#04x}", byte);
                    State::Start
                }
                Err(err) => {
                    crate::dbg::println!("ev3: no ACK ({:?})", err);
                    State::Start
                }
            },
            State::SetSpeed => {
                self.link.configure(self.speed);
                self.timer.delay(SET_SPEED_DELAY);
                // Samples may only flow once the state allows sending.
                self.state = State::WaitingForCommand;
                self.device.start();
                State::WaitingForCommand
            }
            State::WaitingForCommand => {
                match self.next_byte().and_then(|byte| self.handle_command(byte)) {
                    Ok(()) => State::WaitingForCommand,
                    Err(err) => {
                        crate::dbg::println!("ev3: command failed ({:?})", err);
                        self.device.stop();
                        State::Reset
                    }
                }
            }
        };
        if next != prev {
            crate::dbg::println!("ev3: {:?} -> {:?}", prev, next);
        }
        self.state = next;
    }

    /// Waits for the next host byte, transmitting queued samples meanwhile.
    fn next_byte(&mut self) -> Result<u8> {
        let tmo = Timeout::new(&self.timer, HEARTBEAT_TIMEOUT);
        loop {
            match self.link.read_byte() {
                Ok(byte) => return Ok(byte),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(never)) => match never {},
            }
            // Sample traffic must not hold off the heartbeat.
            if tmo.is_expired(&self.timer) {
                return Err(Error::Timeout);
            }
            if let Some(mut sample) = self.samples.try_recv() {
                self.send_data(sample.mode, &mut sample.data, 0, sample.len);
                continue;
            }
            self.timer.wait();
        }
    }

    fn handle_command(&mut self, byte: u8) -> Result<()> {
        match message_class(byte) {
            MessageClass::Sys if byte == NACK => Ok(()),
            MessageClass::Sys => Err(Error::NotExpectedCommand),
            MessageClass::Cmd => {
                let length = payload_length(byte);
                if length > MAX_PAYLOAD {
                    return Err(Error::FormatError);
                }
                let mut buf = [0u8; MAX_PAYLOAD];
                let payload = &mut buf[..length];
                read_command(&mut self.link, &mut self.timer, byte, payload)?;
                match frame::command_id(byte) {
                    CMD_SELECT => self.device.change_mode(payload[0]),
                    CMD_WRITE if payload[0] == C::DEVICE_RESET => self.device.reset(),
                    CMD_WRITE => C::handle_command(&mut self.device, payload),
                    _ => return Err(Error::NotExpectedCommand),
                }
                Ok(())
            }
            MessageClass::Data => Ok(()),
            MessageClass::Info => Err(Error::NotExpectedCommand),
        }
    }

    /// Frames `size` payload bytes found at `buffer[offset + 1..]` as a
    /// `DATA` message for `mode` and transmits it. The frame byte goes to
    /// `buffer[offset]` and the checksum right after the payload.
    ///
    /// Only allowed while commands are being served; returns `false` and
    /// sends nothing otherwise, or when `size` is not a valid payload length.
    pub fn send_data(&mut self, mode: u8, buffer: &mut [u8], offset: usize, size: usize) -> bool {
        if self.state != State::WaitingForCommand {
            return false;
        }
        if !is_pow2(size) || size > MAX_PAYLOAD {
            return false;
        }
        let Some(msg) = offset
            .checked_add(size + 2)
            .and_then(|end| buffer.get_mut(offset..end))
        else {
            return false;
        };
        msg[0] = make_data(mode, size);
        msg[size + 1] = checksum(&msg[..size + 1]);
        self.link.send_data(msg);
        true
    }
}
