//! Fixed-capacity FIFO sample buffer

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Holds at most `capacity` values in arrival order, evicting the oldest
/// value when a new one would overflow it.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        })
    }

    /// Append a value, evicting the oldest one if the window is full
    pub fn add(&mut self, value: T) {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current contents, oldest first
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator + '_ {
        self.values.iter()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.values.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.values.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(RollingWindow::<u64>::new(0).unwrap_err(), Error::ZeroCapacity);
    }

    #[test]
    fn fills_up_to_capacity() {
        let mut window = RollingWindow::new(3).unwrap();
        assert!(window.is_empty());
        window.add(1);
        window.add(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window.oldest(), Some(&1));
        assert_eq!(window.newest(), Some(&2));
    }

    #[test_case(1, 5 ; "capacity one")]
    #[test_case(3, 4 ; "one past capacity")]
    #[test_case(3, 10 ; "many wraps")]
    #[test_case(50, 137 ; "default capacity")]
    fn keeps_last_n_values(capacity: usize, adds: u64) {
        let mut window = RollingWindow::new(capacity).unwrap();
        for v in 0..adds {
            window.add(v);
        }

        let expected: Vec<u64> = (adds - capacity as u64..adds).collect();
        let actual: Vec<u64> = window.iter().copied().collect();
        assert_eq!(actual, expected);
        assert_eq!(window.len(), capacity);
        assert_eq!(window.capacity(), capacity);
    }
}
