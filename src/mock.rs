//! Test doubles for host builds.

extern crate std;

use crate::device::{Commands, Device, DeviceCore, SampleSink};
use crate::event::EventSource;
use crate::link::Link;
use crate::timer::{Instant, Timer};
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::boxed::Box;
use std::collections::VecDeque;
use std::format;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

type Hook = Box<dyn FnMut()>;

/// Clock that advances one millisecond per [`Timer::wait`]. Clones share the
/// same clock. Hooks stand in for interrupts firing while a task waits.
#[derive(Clone, Default)]
pub struct MockTimer {
    ticks: Rc<Cell<u32>>,
    at: Rc<RefCell<Vec<(u32, Hook)>>>,
    every: Rc<RefCell<Vec<Hook>>>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ticks: u32) -> Self {
        let timer = Self::default();
        timer.ticks.set(ticks);
        timer
    }

    /// Runs `f` once when the clock reaches `tick`.
    pub fn on_tick(&self, tick: u32, f: impl FnMut() + 'static) {
        self.at.borrow_mut().push((tick, Box::new(f)));
    }

    pub fn on_every_tick(&self, f: impl FnMut() + 'static) {
        self.every.borrow_mut().push(Box::new(f));
    }
}

impl Timer for MockTimer {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.ticks.get())
    }

    fn wait(&mut self) {
        let now = self.ticks.get().wrapping_add(1);
        self.ticks.set(now);
        for (tick, hook) in self.at.borrow_mut().iter_mut() {
            if *tick == now {
                hook();
            }
        }
        for hook in self.every.borrow_mut().iter_mut() {
            hook();
        }
    }
}

/// Scripted host side of a [`Link`].
#[derive(Default)]
pub struct MockLink {
    rx: VecDeque<u8>,
    blocked_reads: usize,
    sent: Vec<u8>,
    baudrates: Vec<u32>,
    receiving: bool,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Queues `bytes` behind `reads` unsuccessful read attempts.
    pub fn feed_after(&mut self, reads: usize, bytes: &[u8]) {
        self.blocked_reads = reads;
        self.feed(bytes);
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub fn take_sent(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.sent)
    }

    pub fn baudrates(&self) -> &[u32] {
        &self.baudrates
    }

    pub fn is_receiving(&self) -> bool {
        self.receiving
    }
}

impl Link for MockLink {
    fn reset(&mut self) {
        self.rx.clear();
        self.receiving = false;
    }

    fn configure(&mut self, baudrate: u32) {
        self.baudrates.push(baudrate);
    }

    fn start(&mut self) {
        self.receiving = true;
    }

    fn stop(&mut self) {
        self.receiving = false;
    }

    fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        if self.blocked_reads > 0 {
            self.blocked_reads -= 1;
            return Err(nb::Error::WouldBlock);
        }
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn send_data(&mut self, data: &[u8]) {
        self.sent.extend_from_slice(data);
    }
}

/// Records session requests as short strings.
#[derive(Default)]
pub struct MockDevice {
    calls: Vec<String>,
}

impl MockDevice {
    pub fn take_calls(&mut self) -> Vec<String> {
        core::mem::take(&mut self.calls)
    }
}

impl Device for MockDevice {
    fn change_mode(&mut self, mode: u8) {
        self.calls.push(format!("mode {}", mode));
    }

    fn set_scale(&mut self, info: u8) {
        self.calls.push(format!("scale {:#04x}", info));
    }

    fn reset(&mut self) {
        self.calls.push("reset".into());
    }

    fn start(&mut self) {
        self.calls.push("start".into());
    }

    fn stop(&mut self) {
        self.calls.push("stop".into());
    }

    fn write_eeprom(&mut self, info: u8, data: &[u8]) {
        self.calls.push(format!("eeprom {:#04x} {}", info, data.len()));
    }
}

/// Command set of an LSM6DS3 based sensor.
pub struct TestCommands;

impl Commands for TestCommands {
    const DEVICE_RESET: u8 = 0x11;

    fn is_scale_command(command: u8) -> bool {
        (0x20..=0x34).contains(&command)
    }

    fn is_eeprom_command(command: u8) -> bool {
        (0x40..=0x54).contains(&command)
    }

    fn scale_info(command: u8) -> u8 {
        Self::info(command, 0x20)
    }

    fn eeprom_info(command: u8) -> u8 {
        Self::info(command, 0x40)
    }
}

/// Records dispatcher calls. Every data event produces a one byte sample
/// holding the source index.
#[derive(Default)]
pub struct MockCore {
    pub calls: Vec<String>,
}

impl DeviceCore for MockCore {
    fn set_mode(&mut self, mode: u8) {
        self.calls.push(format!("mode {}", mode));
    }

    fn set_scale(&mut self, info: u8) {
        self.calls.push(format!("scale {:#04x}", info));
    }

    fn reset(&mut self) {
        self.calls.push("reset".into());
    }

    fn start(&mut self) {
        self.calls.push("start".into());
    }

    fn stop(&mut self) {
        self.calls.push("stop".into());
    }

    fn handle_event(&mut self, source: EventSource, sink: &SampleSink) {
        self.calls.push(format!("data {:?}", source));
        sink.send(0, &[source as u8]);
    }

    fn update_eeprom(&mut self, info: u8, data: &[u8]) {
        self.calls.push(format!("eeprom {:#04x} {:?}", info, data));
    }
}
