//! Bounded lock-free MPMC queue carrying entries on the fast path

use super::entry::LogEntry;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// The primary ring. Producers insert without blocking; the flusher drains
/// in bulk. Publication of a slot happens-before its observation by the
/// consumer (release/acquire on the channel's per-slot sequence counters).
pub struct PrimaryRing {
    tx: Sender<LogEntry>,
    rx: Receiver<LogEntry>,
}

impl PrimaryRing {
    /// Capacity is fixed at construction; zero is rounded up to one slot.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Non-blocking enqueue. Hands the entry back when the ring is full so
    /// the caller can route it to the fallback queue without cloning.
    pub fn try_enqueue(&self, entry: LogEntry) -> Result<(), LogEntry> {
        match self.tx.try_send(entry) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(entry)) | Err(TrySendError::Disconnected(entry)) => Err(entry),
        }
    }

    /// Pulls up to `max` entries into `out` in FIFO order, returning how
    /// many arrived. Intended for the single flusher; other callers may
    /// race it safely.
    pub fn try_dequeue_bulk(&self, out: &mut Vec<LogEntry>, max: usize) -> usize {
        let mut n = 0;
        while n < max {
            match self.rx.try_recv() {
                Ok(entry) => {
                    out.push(entry);
                    n += 1;
                }
                Err(_) => break,
            }
        }
        n
    }

    /// Conservative emptiness check used by the shutdown drain loop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::LogLevel;

    fn entry(n: usize) -> LogEntry {
        LogEntry::new(LogLevel::Info, &format!("entry {}", n), 1024)
    }

    #[test]
    fn test_enqueue_until_full() {
        let ring = PrimaryRing::with_capacity(4);
        for i in 0..4 {
            assert!(ring.try_enqueue(entry(i)).is_ok());
        }
        let rejected = ring.try_enqueue(entry(99));
        assert!(rejected.is_err());
        assert_eq!(rejected.unwrap_err().message, "entry 99");
    }

    #[test]
    fn test_bulk_dequeue_preserves_order() {
        let ring = PrimaryRing::with_capacity(8);
        for i in 0..6 {
            ring.try_enqueue(entry(i)).unwrap();
        }

        let mut out = Vec::new();
        assert_eq!(ring.try_dequeue_bulk(&mut out, 4), 4);
        assert_eq!(ring.try_dequeue_bulk(&mut out, 4), 2);
        let messages: Vec<&str> = out.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["entry 0", "entry 1", "entry 2", "entry 3", "entry 4", "entry 5"]
        );
        assert!(ring.is_empty());
    }

    #[test]
    fn test_zero_capacity_rounds_up() {
        let ring = PrimaryRing::with_capacity(0);
        assert_eq!(ring.capacity(), 1);
        assert!(ring.try_enqueue(entry(0)).is_ok());
        assert!(ring.try_enqueue(entry(1)).is_err());
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        use std::sync::Arc;

        let ring = Arc::new(PrimaryRing::with_capacity(1024));
        let mut handles = Vec::new();
        for t in 0..4 {
            let ring = Arc::clone(&ring);
            handles.push(std::thread::spawn(move || {
                for i in 0..128 {
                    ring.try_enqueue(entry(t * 1000 + i)).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let mut out = Vec::new();
        ring.try_dequeue_bulk(&mut out, 1024);
        assert_eq!(out.len(), 4 * 128);
    }
}
