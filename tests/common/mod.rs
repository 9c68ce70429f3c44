//! Simulated board: a millisecond clock whose ticks also play the UART
//! interrupt, and register level sensor fakes.

#![allow(dead_code)]

use ev3_uart_sensor::imu::Sensor;
use ev3_uart_sensor::link::{LinkIsr, Uart};
use ev3_uart_sensor::timer::{Instant, Timer};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Both ends of the serial line.
pub struct Wire {
    isr: LinkIsr<'static>,
    now: u32,
    to_device: VecDeque<u8>,
    from_device: Vec<u8>,
    baudrates: Vec<u32>,
    rx_enabled: bool,
    tx_enabled: bool,
    hooks: Vec<(u32, Box<dyn FnMut()>)>,
}

/// Clock and UART of the simulated board. Every [`Timer::wait`] advances
/// the clock by one tick and runs the USART interrupt once: one host byte
/// is received, the whole transmit buffer is drained. Clones share state.
#[derive(Clone)]
pub struct Board(Rc<RefCell<Wire>>);

impl Board {
    pub fn new(isr: LinkIsr<'static>) -> Self {
        Self(Rc::new(RefCell::new(Wire {
            isr,
            now: 0,
            to_device: VecDeque::new(),
            from_device: Vec::new(),
            baudrates: Vec::new(),
            rx_enabled: false,
            tx_enabled: false,
            hooks: Vec::new(),
        })))
    }

    /// Bytes the host puts on the line. They are lost while reception is
    /// disabled, like on the real UART.
    pub fn host_sends(&self, bytes: &[u8]) {
        self.0.borrow_mut().to_device.extend(bytes);
    }

    pub fn take_received(&self) -> Vec<u8> {
        std::mem::take(&mut self.0.borrow_mut().from_device)
    }

    pub fn baudrates(&self) -> Vec<u32> {
        self.0.borrow().baudrates.clone()
    }

    pub fn ticks(&self) -> u32 {
        self.0.borrow().now
    }

    pub fn uart(&self) -> BoardUart {
        BoardUart(self.0.clone())
    }

    /// Runs `f` once when the clock reaches `tick`, e.g. a sensor interrupt.
    pub fn at(&self, tick: u32, f: impl FnMut() + 'static) {
        self.0.borrow_mut().hooks.push((tick, Box::new(f)));
    }
}

impl Timer for Board {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.0.borrow().now)
    }

    fn wait(&mut self) {
        let mut due = Vec::new();
        {
            let mut wire = self.0.borrow_mut();
            wire.now += 1;
            let now = wire.now;
            if let Some(byte) = wire.to_device.pop_front() {
                if wire.rx_enabled {
                    wire.isr.on_byte_received(byte);
                }
            }
            if wire.tx_enabled {
                while let Some(byte) = wire.isr.on_byte_to_transmit() {
                    wire.from_device.push(byte);
                }
                wire.tx_enabled = false;
            }
            let hooks = std::mem::take(&mut wire.hooks);
            for (tick, hook) in hooks {
                if tick == now {
                    due.push(hook);
                } else {
                    wire.hooks.push((tick, hook));
                }
            }
        }
        for mut hook in due {
            hook();
        }
    }
}

pub struct BoardUart(Rc<RefCell<Wire>>);

impl Uart for BoardUart {
    fn set_baudrate(&mut self, baudrate: u32) {
        self.0.borrow_mut().baudrates.push(baudrate);
    }

    fn listen_rx(&mut self, enable: bool) {
        self.0.borrow_mut().rx_enabled = enable;
    }

    fn listen_tx(&mut self, enable: bool) {
        self.0.borrow_mut().tx_enabled = enable;
    }
}

pub type Log = Rc<RefCell<Vec<String>>>;

/// Sensor answering every read with a fixed pattern.
pub struct FakeSensor {
    name: &'static str,
    log: Log,
    fill: u8,
}

impl FakeSensor {
    pub fn new(name: &'static str, log: &Log, fill: u8) -> Self {
        Self {
            name,
            log: log.clone(),
            fill,
        }
    }

    fn record(&self, what: &str) {
        self.log.borrow_mut().push(format!("{} {}", self.name, what));
    }
}

impl Sensor for FakeSensor {
    fn init(&mut self) {
        self.record("init");
    }

    fn reset(&mut self) {
        self.record("reset");
    }

    fn set_scale(&mut self, scale: u8) {
        self.record(&format!("scale {}", scale));
    }

    fn check_device(&mut self) -> bool {
        true
    }

    fn read_sample(&mut self, out: &mut [u8]) -> bool {
        out.fill(self.fill);
        true
    }

    fn update_eeprom(&mut self, scale: u8, data: &[u8]) {
        self.record(&format!("eeprom {} {}", scale, data.len()));
    }
}

/// `frame`, `payload` and the checksum.
pub fn message(frame: u8, payload: &[u8]) -> Vec<u8> {
    let mut msg = vec![frame];
    msg.extend_from_slice(payload);
    msg.push(ev3_uart_sensor::ev3::frame::checksum(&msg));
    msg
}
