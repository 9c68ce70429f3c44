use core::mem::MaybeUninit;

/// Fixed capacity FIFO store with free-running read and write counters.
///
/// `N` must be a power of two; the slot of a counter is `count & (N - 1)`.
/// The counters wrap, so `write_count - read_count` is always the number of
/// stored items. The buffer does no locking of its own, every mutation must
/// happen with exclusive access (see [`super::Channel`]).
pub struct RingBuffer<T, const N: usize> {
    buffer: [MaybeUninit<T>; N],
    read_count: usize,
    write_count: usize,
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    const INIT: MaybeUninit<T> = MaybeUninit::uninit();
    const MASK: usize = {
        assert!(N != 0 && N & (N - 1) == 0, "capacity must be a power of 2");
        N - 1
    };

    pub const fn new() -> Self {
        // Forces the capacity check for every instantiated `N`.
        let _ = Self::MASK;
        Self {
            buffer: [Self::INIT; N],
            read_count: 0,
            write_count: 0,
        }
    }

    #[inline(always)]
    fn index(count: usize) -> usize {
        count & Self::MASK
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.write_count.wrapping_sub(self.read_count)
    }

    pub fn is_empty(&self) -> bool {
        self.write_count == self.read_count
    }

    pub fn is_full(&self) -> bool {
        self.len() & !Self::MASK != 0
    }

    pub fn write_available(&self) -> usize {
        N - self.len()
    }

    /// Appends `value`. Hands it back when the buffer is full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.buffer[Self::index(self.write_count)] = MaybeUninit::new(value);
        self.write_count = self.write_count.wrapping_add(1);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: every slot between the read and the write counter was
        // initialized by `push` or `push_slice`.
        let value =
            unsafe { self.buffer[Self::index(self.read_count)].assume_init() };
        self.read_count = self.read_count.wrapping_add(1);
        Some(value)
    }

    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // SAFETY: see `pop`.
        Some(unsafe {
            self.buffer[Self::index(self.read_count)].assume_init_ref()
        })
    }

    /// Copies as much of `data` as fits and returns the number of items taken.
    pub fn push_slice(&mut self, data: &[T]) -> usize {
        let count = data.len().min(self.write_available());
        let start = Self::index(self.write_count);
        let first = count.min(N - start);
        for (slot, &value) in
            self.buffer[start..start + first].iter_mut().zip(data)
        {
            *slot = MaybeUninit::new(value);
        }
        for (slot, &value) in
            self.buffer[..count - first].iter_mut().zip(&data[first..count])
        {
            *slot = MaybeUninit::new(value);
        }
        self.write_count = self.write_count.wrapping_add(count);
        count
    }

    /// Moves up to `out.len()` items into `out`, returns how many were moved.
    pub fn pop_slice(&mut self, out: &mut [T]) -> usize {
        let count = out.len().min(self.len());
        for item in out[..count].iter_mut() {
            // SAFETY: `count` never exceeds the number of stored items.
            *item = unsafe {
                self.buffer[Self::index(self.read_count)].assume_init()
            };
            self.read_count = self.read_count.wrapping_add(1);
        }
        count
    }

    /// Drops every stored item.
    pub fn flush(&mut self) {
        self.write_count = self.read_count;
    }
}

impl<T: Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ring = RingBuffer::<u8, 4>::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.capacity(), 4);
    }

    #[test]
    fn fifo_order() {
        let mut ring = RingBuffer::<u8, 8>::new();
        for v in 1..=8 {
            ring.push(v).unwrap();
        }
        assert!(ring.is_full());
        assert_eq!(ring.push(9), Err(9));
        for v in 1..=8 {
            assert_eq!(ring.pop(), Some(v));
        }
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn size_stays_in_bounds_across_wrap() {
        let mut ring = RingBuffer::<u16, 4>::new();
        let mut next = 0u16;
        let mut expected = 0u16;
        // Uneven push/pop pattern so the counters lap the slots many times.
        for round in 0..200 {
            for _ in 0..(round % 5) {
                if ring.push(next).is_ok() {
                    next += 1;
                }
            }
            for _ in 0..(round % 3) {
                if let Some(v) = ring.pop() {
                    assert_eq!(v, expected);
                    expected += 1;
                }
            }
            assert!(ring.len() <= ring.capacity());
            assert!(!(ring.is_empty() && ring.is_full()));
        }
    }

    #[test]
    fn counters_wrap_around_usize() {
        let mut ring = RingBuffer::<u8, 4> {
            read_count: usize::MAX - 1,
            write_count: usize::MAX - 1,
            ..RingBuffer::new()
        };
        for v in 0..4 {
            ring.push(v).unwrap();
        }
        assert!(ring.is_full());
        assert_eq!(ring.len(), 4);
        for v in 0..4 {
            assert_eq!(ring.pop(), Some(v));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn slices_split_at_the_end_of_storage() {
        let mut ring = RingBuffer::<u8, 8>::new();
        assert_eq!(ring.push_slice(&[0; 6]), 6);
        let mut sink = [0; 6];
        assert_eq!(ring.pop_slice(&mut sink), 6);

        assert_eq!(ring.push_slice(&[1, 2, 3, 4, 5, 6, 7, 8, 9]), 8);
        assert!(ring.is_full());
        assert_eq!(ring.front(), Some(&1));

        let mut out = [0; 10];
        assert_eq!(ring.pop_slice(&mut out), 8);
        assert_eq!(&out[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn flush_discards_content() {
        let mut ring = RingBuffer::<u8, 4>::new();
        ring.push_slice(&[1, 2, 3]);
        ring.flush();
        assert!(ring.is_empty());
        assert_eq!(ring.write_available(), 4);
    }
}
