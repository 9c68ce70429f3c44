//! Routes queued events to the sensor logic.

use crate::device::{DeviceCore, SampleChannel, SampleSink};
use crate::eeprom::{EepromBuffer, CALIBRATION_SIZE};
use crate::event::{Event, EventChannel, EventKind, EventSource};
use crate::timer::Timer;

pub struct Dispatcher<'a, D> {
    core: D,
    events: &'a EventChannel,
    eeprom: &'a EepromBuffer<CALIBRATION_SIZE>,
    sink: SampleSink<'a>,
    reported_drops: u32,
}

impl<'a, D: DeviceCore> Dispatcher<'a, D> {
    pub fn new(
        core: D,
        events: &'a EventChannel,
        eeprom: &'a EepromBuffer<CALIBRATION_SIZE>,
        samples: &'a SampleChannel,
    ) -> Self {
        Self {
            core,
            events,
            eeprom,
            sink: SampleSink::new(samples),
            reported_drops: 0,
        }
    }

    pub fn core(&mut self) -> &mut D {
        &mut self.core
    }

    pub fn dispatch(&mut self, event: Event) {
        let info = event.info();
        match event.kind() {
            EventKind::Data => match EventSource::try_from(info) {
                Ok(source) => {
                    self.core.handle_event(source, &self.sink);
                    self.report_drops();
                }
                Err(_) => crate::dbg::println!("dispatch: unknown source {}", info),
            },
            EventKind::Scale => self.core.set_scale(info),
            EventKind::Mode => self.core.set_mode(info),
            EventKind::Reset => self.core.reset(),
            EventKind::Start => self.core.start(),
            EventKind::Stop => self.core.stop(),
            EventKind::Request => {}
            EventKind::Eeprom => {
                let core = &mut self.core;
                self.eeprom.flush_to(|data| core.update_eeprom(info, data));
            }
        }
    }

    /// Blocks until an event arrives and dispatches it.
    pub fn run_once<T: Timer + ?Sized>(&mut self, timer: &mut T) {
        if let Some(event) = self.events.recv(timer, None) {
            self.dispatch(event);
        }
    }

    /// Dispatches every queued event, returns how many there were.
    pub fn poll(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.events.try_recv() {
            self.dispatch(event);
            count += 1;
        }
        count
    }

    fn report_drops(&mut self) {
        let dropped = self.sink.dropped();
        if dropped != self.reported_drops {
            crate::dbg::println!(
                "dispatch: {} samples dropped",
                dropped.wrapping_sub(self.reported_drops)
            );
            self.reported_drops = dropped;
        }
    }
}
