//! Byte link to the EV3 host.
//!
//! The session task talks to a [`Link`]. [`UartLink`] is the interrupt
//! driven implementation: the receive and transmit interrupts move single
//! bytes between the UART and two [`Channel`]s through [`LinkIsr`], the task
//! side only ever touches the channels.

use crate::ev3::{Error, Result};
use crate::queue::Channel;
use crate::timer::{Duration, Timeout, Timer};
use core::convert::Infallible;

pub const RX_BUFFER_SIZE: usize = 32;
pub const TX_BUFFER_SIZE: usize = 64;

pub type RxChannel = Channel<u8, RX_BUFFER_SIZE>;
pub type TxChannel = Channel<u8, TX_BUFFER_SIZE>;

pub trait Link {
    /// Stops all traffic and drops buffered bytes.
    fn reset(&mut self);
    fn configure(&mut self, baudrate: u32);
    /// Clears the receive buffer and enables reception.
    fn start(&mut self);
    fn stop(&mut self);
    fn read_byte(&mut self) -> nb::Result<u8, Infallible>;
    /// Transmits `data` and returns once the last byte left the buffer.
    fn send_data(&mut self, data: &[u8]);
}

/// Waits up to `timeout` for the next received byte.
pub fn get_byte<L, T>(link: &mut L, timer: &mut T, timeout: Duration) -> Result<u8>
where
    L: Link + ?Sized,
    T: Timer + ?Sized,
{
    let tmo = Timeout::new(&*timer, timeout);
    loop {
        match link.read_byte() {
            Ok(byte) => return Ok(byte),
            Err(nb::Error::WouldBlock) => {}
            Err(nb::Error::Other(never)) => match never {},
        }
        if tmo.is_expired(&*timer) {
            return Err(Error::Timeout);
        }
        timer.wait();
    }
}

/// Register level control of the UART used by [`UartLink`].
pub trait Uart {
    fn set_baudrate(&mut self, baudrate: u32);
    fn listen_rx(&mut self, enable: bool);
    /// Enables the "transmit register empty" interrupt.
    fn listen_tx(&mut self, enable: bool);
}

pub struct UartLink<'a, U, T> {
    uart: U,
    timer: T,
    rx: &'a RxChannel,
    tx: &'a TxChannel,
    reported_overruns: u32,
}

impl<'a, U: Uart, T: Timer> UartLink<'a, U, T> {
    pub fn new(uart: U, timer: T, rx: &'a RxChannel, tx: &'a TxChannel) -> Self {
        Self {
            uart,
            timer,
            rx,
            tx,
            reported_overruns: 0,
        }
    }

    pub fn uart(&mut self) -> &mut U {
        &mut self.uart
    }
}

impl<'a, U: Uart, T: Timer> Link for UartLink<'a, U, T> {
    fn reset(&mut self) {
        self.uart.listen_rx(false);
        self.uart.listen_tx(false);
        self.rx.clear();
        self.tx.clear();
        let overruns = self.rx.dropped();
        if overruns != self.reported_overruns {
            crate::dbg::println!(
                "link: {} bytes lost to receive overrun",
                overruns.wrapping_sub(self.reported_overruns)
            );
            self.reported_overruns = overruns;
        }
    }

    fn configure(&mut self, baudrate: u32) {
        self.uart.set_baudrate(baudrate);
    }

    fn start(&mut self) {
        self.rx.clear();
        self.uart.listen_rx(true);
    }

    fn stop(&mut self) {
        self.uart.listen_rx(false);
    }

    fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        self.rx.try_recv().ok_or(nb::Error::WouldBlock)
    }

    fn send_data(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let written = self.tx.try_send_slice(data);
            data = &data[written..];
            if written > 0 {
                self.uart.listen_tx(true);
            }
            if !data.is_empty() {
                self.timer.wait();
            }
        }
        while !self.tx.is_empty() {
            self.timer.wait();
        }
    }
}

/// Interrupt side of [`UartLink`].
#[derive(Clone, Copy)]
pub struct LinkIsr<'a> {
    rx: &'a RxChannel,
    tx: &'a TxChannel,
}

impl<'a> LinkIsr<'a> {
    pub fn new(rx: &'a RxChannel, tx: &'a TxChannel) -> Self {
        Self { rx, tx }
    }

    /// Stores a received byte. Bytes arriving while the buffer is full are
    /// lost; [`LinkIsr::overruns`] counts them.
    pub fn on_byte_received(&self, byte: u8) {
        let _ = self.rx.try_send(byte);
    }

    /// Next byte for the transmit register. `None` means the buffer ran dry
    /// and the transmit interrupt should be disabled.
    pub fn on_byte_to_transmit(&self) -> Option<u8> {
        self.tx.try_recv()
    }

    pub fn overruns(&self) -> u32 {
        self.rx.dropped()
    }
}
