//! Two-slot buffers for stationary iterations.
//!
//! A stationary sweep reads the previous iterate while writing the next.
//! `DoubleBuffer` keeps both slots in place and flips a role flag instead
//! of exchanging storage, so neither slot is ever reallocated.

/// Two named slots with an explicit current/next role.
#[derive(Clone, Debug)]
pub struct DoubleBuffer<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> DoubleBuffer<T> {
    /// Create with `current` holding the starting iterate.
    pub fn new(current: T, next: T) -> Self {
        Self {
            slots: [current, next],
            current: 0,
        }
    }

    /// The most recently completed iterate.
    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    /// The slot being written.
    pub fn next_mut(&mut self) -> &mut T {
        &mut self.slots[1 - self.current]
    }

    /// Read the current iterate and write the next one at the same time.
    pub fn split(&mut self) -> (&T, &mut T) {
        let (a, b) = self.slots.split_at_mut(1);
        if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    /// Promote the next slot to current.
    pub fn flip(&mut self) {
        self.current = 1 - self.current;
    }

    /// Consume the buffer, keeping the current iterate.
    pub fn into_current(self) -> T {
        let [a, b] = self.slots;
        if self.current == 0 { a } else { b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_alternates_roles() {
        let mut buf = DoubleBuffer::new(vec![1.0], vec![0.0]);
        {
            let (cur, next) = buf.split();
            next[0] = cur[0] * 2.0;
        }
        buf.flip();
        assert_eq!(buf.current()[0], 2.0);

        {
            let (cur, next) = buf.split();
            next[0] = cur[0] * 2.0;
        }
        buf.flip();
        assert_eq!(buf.current()[0], 4.0);
        assert_eq!(buf.into_current(), vec![4.0]);
    }

    #[test]
    fn next_slot_is_distinct() {
        let mut buf = DoubleBuffer::new(1, 2);
        *buf.next_mut() = 5;
        assert_eq!(*buf.current(), 1);
        buf.flip();
        assert_eq!(*buf.current(), 5);
    }
}
