//! Millisecond time base shared by the session task and the channels.

use fugit::{TimerDurationU32, TimerInstantU32};

pub type Instant = TimerInstantU32<1_000>;
pub type Duration = TimerDurationU32<1_000>;

/// Time source and suspension point of a cooperative task.
pub trait Timer {
    fn now(&self) -> Instant;

    /// Parks the calling task until something may have changed, usually the
    /// next interrupt. Must not block forever when time is still advancing.
    fn wait(&mut self);

    fn delay(&mut self, duration: Duration) {
        let mut tmo = Timeout::default();
        tmo.set(&*self, duration);
        while !tmo.is_expired(&*self) {
            self.wait();
        }
    }
}

impl<T: Timer + ?Sized> Timer for &mut T {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn wait(&mut self) {
        (**self).wait()
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct Timeout {
    tmo: u32,
    tmo_start_time: u32,
}

impl Timeout {
    pub fn new<T: Timer + ?Sized>(timer: &T, tmo: Duration) -> Self {
        let mut timeout = Self::default();
        timeout.set(timer, tmo);
        timeout
    }

    pub fn is_expired<T: Timer + ?Sized>(&self, timer: &T) -> bool {
        let now = timer.now().ticks();
        let Timeout {
            tmo,
            tmo_start_time,
        } = *self;
        now.wrapping_sub(tmo_start_time) >= tmo
    }

    pub fn set<T: Timer + ?Sized>(&mut self, timer: &T, tmo: Duration) {
        *self = Timeout {
            tmo: tmo.ticks(),
            tmo_start_time: timer.now().ticks(),
        };
    }
}
