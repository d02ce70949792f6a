//! Mutex-protected rescue FIFO for entries the primary ring rejects

use super::entry::LogEntry;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// The fallback queue. A rescue channel, not a steady-state path: the lock
/// is held only across enqueue or bulk dequeue, never across I/O.
pub struct FallbackQueue {
    inner: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl FallbackQueue {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Enqueue under the mutex. At capacity the newest entry is refused and
    /// handed back; the caller decides whether to spin on the primary ring.
    pub fn try_push(&self, entry: LogEntry) -> Result<(), LogEntry> {
        let mut queue = self.inner.lock();
        if queue.len() >= self.capacity {
            return Err(entry);
        }
        queue.push_back(entry);
        Ok(())
    }

    /// Moves up to `max` entries into `out` in FIFO order. The lock is
    /// released before the caller touches any sink.
    pub fn drain_into(&self, out: &mut Vec<LogEntry>, max: usize) -> usize {
        let mut queue = self.inner.lock();
        let n = max.min(queue.len());
        out.extend(queue.drain(..n));
        n
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::LogLevel;

    fn entry(n: usize) -> LogEntry {
        LogEntry::new(LogLevel::Warn, &format!("rescue {}", n), 1024)
    }

    #[test]
    fn test_push_and_drain_fifo() {
        let queue = FallbackQueue::with_capacity(8);
        for i in 0..5 {
            queue.try_push(entry(i)).unwrap();
        }
        assert_eq!(queue.len(), 5);

        let mut out = Vec::new();
        assert_eq!(queue.drain_into(&mut out, 3), 3);
        assert_eq!(out[0].message, "rescue 0");
        assert_eq!(out[2].message, "rescue 2");
        assert_eq!(queue.drain_into(&mut out, 10), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_refuses_newest_at_capacity() {
        let queue = FallbackQueue::with_capacity(2);
        queue.try_push(entry(0)).unwrap();
        queue.try_push(entry(1)).unwrap();

        let refused = queue.try_push(entry(2));
        assert!(refused.is_err());
        assert_eq!(refused.unwrap_err().message, "rescue 2");

        // the queued entries are untouched
        let mut out = Vec::new();
        queue.drain_into(&mut out, 4);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].message, "rescue 0");
    }

    #[test]
    fn test_zero_capacity_rounds_up() {
        let queue = FallbackQueue::with_capacity(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.try_push(entry(0)).is_ok());
        assert!(queue.try_push(entry(1)).is_err());
    }
}
