//! Staging area for calibration data sent by the host.
//!
//! The session task latches the payload of a calibration command here and
//! queues an EEPROM event; the dispatch task later hands the latched bytes
//! to the device and clears the buffer.

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Vec;

/// Size of one calibration record, a 3x4 matrix of `i16`.
pub const CALIBRATION_SIZE: usize = 24;

pub struct EepromBuffer<const N: usize> {
    data: Mutex<RefCell<Vec<u8, N>>>,
}

impl<const N: usize> EepromBuffer<N> {
    pub const fn new() -> Self {
        Self {
            data: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Latches the first `N` bytes of `data`. Ignored while a previous record
    /// is pending or when `data` is too short.
    pub fn write(&self, data: &[u8]) -> bool {
        critical_section::with(|cs| {
            let mut buf = self.data.borrow_ref_mut(cs);
            if !buf.is_empty() || data.len() < N {
                return false;
            }
            buf.extend_from_slice(&data[..N]).is_ok()
        })
    }

    /// Passes the pending record, possibly empty, to `f` and clears the
    /// buffer.
    pub fn flush_to<F: FnOnce(&[u8])>(&self, f: F) {
        let pending = critical_section::with(|cs| {
            core::mem::take(&mut *self.data.borrow_ref_mut(cs))
        });
        f(&pending);
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.data.borrow_ref(cs).is_empty())
    }
}

impl<const N: usize> Default for EepromBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::vec::Vec;

    #[test]
    fn short_payload_is_ignored() {
        let buf = EepromBuffer::<4>::new();
        assert!(!buf.write(&[1, 2, 3]));
        assert!(buf.is_empty());
    }

    #[test]
    fn pending_record_is_not_overwritten() {
        let buf = EepromBuffer::<4>::new();
        assert!(buf.write(&[1, 2, 3, 4, 5]));
        assert!(!buf.write(&[9, 9, 9, 9]));

        let mut seen = Vec::new();
        buf.flush_to(|data| seen.extend_from_slice(data));
        assert_eq!(seen, [1, 2, 3, 4]);
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_of_empty_buffer_passes_nothing() {
        let buf = EepromBuffer::<CALIBRATION_SIZE>::new();
        let mut calls = 0;
        buf.flush_to(|data| {
            assert!(data.is_empty());
            calls += 1;
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn buffer_accepts_next_record_after_flush() {
        let buf = EepromBuffer::<2>::new();
        buf.write(&[1, 2]);
        buf.flush_to(|_| {});
        assert!(buf.write(&[3, 4]));
    }
}
