use super::RingBuffer;
use crate::timer::{Duration, Timeout, Timer};
use core::cell::RefCell;
use critical_section::Mutex;

struct Inner<T, const N: usize> {
    ring: RingBuffer<T, N>,
    dropped: u32,
}

/// Bounded FIFO shared between interrupt handlers and tasks.
///
/// Every access runs inside a critical section, so any number of producers
/// and consumers may share one channel and arrival order is delivery order.
/// The `try_*` operations never wait and are the only ones allowed in
/// interrupt context. The blocking operations park the calling task through
/// its [`Timer`] until the operation succeeds or the timeout expires.
pub struct Channel<T, const N: usize> {
    inner: Mutex<RefCell<Inner<T, N>>>,
}

impl<T: Copy, const N: usize> Channel<T, N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                ring: RingBuffer::new(),
                dropped: 0,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<T, N>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// Queues `item` if there is room. A rejected item is counted in
    /// [`Channel::dropped`] and handed back.
    pub fn try_send(&self, item: T) -> Result<(), T> {
        self.with(|inner| {
            inner.ring.push(item).map_err(|item| {
                inner.dropped = inner.dropped.wrapping_add(1);
                item
            })
        })
    }

    pub fn try_recv(&self) -> Option<T> {
        self.with(|inner| inner.ring.pop())
    }

    /// Queues as many items of `data` as fit, returns how many were taken.
    pub fn try_send_slice(&self, data: &[T]) -> usize {
        self.with(|inner| inner.ring.push_slice(data))
    }

    /// Waits for room and queues `item`. `None` waits forever.
    pub fn send<W: Timer + ?Sized>(
        &self,
        mut item: T,
        timer: &mut W,
        timeout: Option<Duration>,
    ) -> Result<(), T> {
        let tmo = timeout.map(|d| Timeout::new(&*timer, d));
        loop {
            match self.with(|inner| inner.ring.push(item)) {
                Ok(()) => return Ok(()),
                Err(rejected) => item = rejected,
            }
            if tmo.map_or(false, |t| t.is_expired(&*timer)) {
                return Err(item);
            }
            timer.wait();
        }
    }

    /// Waits for an item. `None` waits forever.
    pub fn recv<W: Timer + ?Sized>(
        &self,
        timer: &mut W,
        timeout: Option<Duration>,
    ) -> Option<T> {
        let tmo = timeout.map(|d| Timeout::new(&*timer, d));
        loop {
            if let Some(item) = self.try_recv() {
                return Some(item);
            }
            if tmo.map_or(false, |t| t.is_expired(&*timer)) {
                return None;
            }
            timer.wait();
        }
    }

    pub fn len(&self) -> usize {
        self.with(|inner| inner.ring.len())
    }

    pub fn is_empty(&self) -> bool {
        self.with(|inner| inner.ring.is_empty())
    }

    pub fn is_full(&self) -> bool {
        self.with(|inner| inner.ring.is_full())
    }

    pub fn free_space(&self) -> usize {
        self.with(|inner| inner.ring.write_available())
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of items rejected by [`Channel::try_send`] since start up.
    pub fn dropped(&self) -> u32 {
        self.with(|inner| inner.dropped)
    }

    pub fn clear(&self) {
        self.with(|inner| inner.ring.flush())
    }
}

impl<T: Copy, const N: usize> Default for Channel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
