#![no_main]
#![no_std]

mod lsm6ds3;
mod uart;

use core::cell::RefCell;
use critical_section::Mutex;
use ev3_uart_sensor::device::SampleChannel;
use ev3_uart_sensor::eeprom::{EepromBuffer, CALIBRATION_SIZE};
use ev3_uart_sensor::event::EventChannel;
use ev3_uart_sensor::link::{RxChannel, TxChannel};
use stm32f4xx_hal::{
    gpio::{Alternate, Output, PushPull, PA4, PA5, PA6, PA7},
    pac,
    spi::Spi,
};

type ImuSpi = Spi<pac::SPI1, (PA5<Alternate<5>>, PA6<Alternate<5>>, PA7<Alternate<5>>)>;
type ImuCs = PA4<Output<PushPull>>;
type Accelerometer = lsm6ds3::Accelerometer<'static, ImuSpi, ImuCs>;
type Gyroscope = lsm6ds3::Gyroscope<'static, ImuSpi, ImuCs>;

static RX: RxChannel = RxChannel::new();
static TX: TxChannel = TxChannel::new();
static EVENTS: EventChannel = EventChannel::new();
static EEPROM: EepromBuffer<CALIBRATION_SIZE> = EepromBuffer::new();
static SAMPLES: SampleChannel = SampleChannel::new();
static IMU_BUS: lsm6ds3::Bus<ImuSpi, ImuCs> = Mutex::new(RefCell::new(None));

#[rtic::app(
    device = stm32f4xx_hal::pac,
    peripherals = true,
    dispatchers = [SPI2]
)]
mod app {
    use crate::{lsm6ds3, uart::BoardUart, Accelerometer, Gyroscope};
    use crate::{EEPROM, EVENTS, IMU_BUS, RX, SAMPLES, TX};
    use ev3_uart_sensor::{
        dbg,
        device::EventSender,
        dispatch::Dispatcher,
        ev3::{Descriptor, Session},
        event::{Event, EventSource},
        imu::{self, ImuCore, Lsm6ds3Commands},
        link::{LinkIsr, UartLink},
        timer::{Instant, Timer},
    };
    use hal::{
        gpio::*,
        prelude::*,
        serial::{config, Event as SerialEvent, RxISR, Serial, Serial1, TxISR},
        time,
    };
    use stm32f4xx_hal as hal;
    use systick_monotonic::Systick;

    /// Millisecond clock of the session task. Waiting sleeps until the next
    /// interrupt, the systick fires every tick.
    #[derive(Clone, Copy)]
    pub struct IdleTimer;

    impl Timer for IdleTimer {
        fn now(&self) -> Instant {
            Instant::from_ticks(monotonics::now().ticks() as u32)
        }

        fn wait(&mut self) {
            cortex_m::asm::wfi();
        }
    }

    type Link = UartLink<'static, BoardUart, IdleTimer>;
    type Sender = EventSender<'static, IdleTimer>;
    type Ev3Session = Session<'static, Link, IdleTimer, Sender, Lsm6ds3Commands>;
    type SerialEv3 = Serial1<(PA9<Alternate<7>>, PA10<Alternate<7>>), u8>;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        session: Ev3Session,
        dispatcher: Dispatcher<'static, ImuCore<Accelerometer, Gyroscope>>,
        serial: SerialEv3,
        link_isr: LinkIsr<'static>,
        accel_int: PB0<Input>,
        gyro_int: PB1<Input>,
    }

    #[monotonic(binds = SysTick, default = true)]
    type MillisecMono = Systick<1000>;

    #[init(local = [descriptor: Option<Descriptor> = None])]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        dbg::init!();
        dbg::println!("init");

        let mut dp = ctx.device;

        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.use_hse(8.MHz()).sysclk(48.MHz()).freeze();

        let mono = Systick::new(ctx.core.SYST, clocks.sysclk().raw());

        let gpioa = dp.GPIOA.split();
        let gpiob = dp.GPIOB.split();

        let serial: SerialEv3 = Serial::new(
            dp.USART1,
            (
                gpioa.pa9.into_alternate().internal_resistor(Pull::None).speed(Speed::VeryHigh),
                gpioa.pa10.into_alternate().internal_resistor(Pull::None).speed(Speed::VeryHigh),
            ),
            config::Config::default()
                .wordlength_8()
                .baudrate(time::Bps(2400))
                .stopbits(config::StopBits::STOP1)
                .parity_none(),
            &clocks,
        )
        .unwrap();

        let spi = dp.SPI1.spi(
            (
                gpioa.pa5.into_alternate(),
                gpioa.pa6.into_alternate(),
                gpioa.pa7.into_alternate(),
            ),
            embedded_hal::spi::MODE_3,
            8.MHz(),
            &clocks,
        );
        let cs = gpioa.pa4.into_push_pull_output();
        critical_section::with(|cs_token| {
            IMU_BUS
                .borrow_ref_mut(cs_token)
                .replace(lsm6ds3::Transport::new(spi, cs));
        });

        let mut syscfg = dp.SYSCFG.constrain();
        let mut accel_int = gpiob.pb0.into_pull_down_input();
        let mut gyro_int = gpiob.pb1.into_pull_down_input();
        accel_int.make_interrupt_source(&mut syscfg);
        accel_int.trigger_on_edge(&mut dp.EXTI, Edge::Rising);
        accel_int.enable_interrupt(&mut dp.EXTI);
        gyro_int.make_interrupt_source(&mut syscfg);
        gyro_int.trigger_on_edge(&mut dp.EXTI, Edge::Rising);
        gyro_int.enable_interrupt(&mut dp.EXTI);

        let descriptor: &'static Descriptor = ctx
            .local
            .descriptor
            .insert(Descriptor::build(imu::TYPE_ID, imu::SPEED, &imu::MODES).unwrap());

        let link = UartLink::new(BoardUart::new(clocks.pclk2().raw()), IdleTimer, &RX, &TX);
        let sender = EventSender::new(&EVENTS, &EEPROM, IdleTimer).with_notify(|| {
            let _ = dispatch::spawn();
        });
        let session = Session::new(
            link,
            IdleTimer,
            sender,
            descriptor.as_bytes(),
            imu::SPEED,
            &SAMPLES,
        );

        let core = ImuCore::new(Accelerometer::new(&IMU_BUS), Gyroscope::new(&IMU_BUS));
        let dispatcher = Dispatcher::new(core, &EVENTS, &EEPROM, &SAMPLES);

        dbg::println!("init end");
        (
            Shared {},
            Local {
                session,
                dispatcher,
                serial,
                link_isr: LinkIsr::new(&RX, &TX),
                accel_int,
                gyro_int,
            },
            init::Monotonics(mono),
        )
    }

    #[idle(local = [session])]
    fn idle(ctx: idle::Context) -> ! {
        loop {
            ctx.local.session.process();
        }
    }

    #[task(local = [dispatcher], priority = 1)]
    fn dispatch(ctx: dispatch::Context) {
        ctx.local.dispatcher.poll();
    }

    #[task(binds = EXTI0, local = [accel_int], priority = 2)]
    fn accel_ready(ctx: accel_ready::Context) {
        ctx.local.accel_int.clear_interrupt_pending_bit();
        data_ready(EventSource::Accelerometer);
    }

    #[task(binds = EXTI1, local = [gyro_int], priority = 2)]
    fn gyro_ready(ctx: gyro_ready::Context) {
        ctx.local.gyro_int.clear_interrupt_pending_bit();
        data_ready(EventSource::Gyroscope);
    }

    fn data_ready(source: EventSource) {
        if EVENTS.try_send(Event::data(source)).is_err() {
            dbg::println!("event queue full");
        }
        let _ = dispatch::spawn();
    }

    #[task(binds = USART1, local = [serial, link_isr], priority = 3)]
    fn usart1(ctx: usart1::Context) {
        let usart1::LocalResources { serial, link_isr } = ctx.local;
        while serial.is_rx_not_empty() {
            match serial.read() {
                Ok(byte) => link_isr.on_byte_received(byte),
                Err(_) => break,
            }
        }
        if serial.is_tx_empty() {
            match link_isr.on_byte_to_transmit() {
                Some(byte) => {
                    let _ = serial.write(byte);
                }
                None => serial.unlisten(SerialEvent::Txe),
            }
        }
    }
}
