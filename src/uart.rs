use ev3_uart_sensor::link::Uart;
use stm32f4xx_hal::pac;

/// Session side control of USART1. The HAL `Serial` instance stays with the
/// interrupt task, this only touches the baud rate and interrupt enables.
pub struct BoardUart {
    pclk: u32,
}

impl BoardUart {
    pub fn new(pclk: u32) -> Self {
        Self { pclk }
    }

    fn regs() -> &'static pac::usart1::RegisterBlock {
        // SAFETY: read-modify-write accesses below run in a critical section,
        // the interrupt task never writes BRR
        unsafe { &*pac::USART1::ptr() }
    }
}

impl Uart for BoardUart {
    fn set_baudrate(&mut self, baudrate: u32) {
        // 16x oversampling, rounded to nearest
        let div = (self.pclk + baudrate / 2) / baudrate;
        Self::regs().brr.write(|w| unsafe { w.bits(div) });
    }

    fn listen_rx(&mut self, enable: bool) {
        critical_section::with(|_| Self::regs().cr1.modify(|_, w| w.rxneie().bit(enable)));
    }

    fn listen_tx(&mut self, enable: bool) {
        critical_section::with(|_| Self::regs().cr1.modify(|_, w| w.txeie().bit(enable)));
    }
}
