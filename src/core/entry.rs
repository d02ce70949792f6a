//! Queue record carried from producers to the flusher

use super::level::LogLevel;
use chrono::Utc;
use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// Thread-local id cache so the fast path never recomputes the hash
thread_local! {
    static THREAD_ID_CACHE: Cell<u32> = const { Cell::new(0) };
}

/// Stable identifier for the calling thread.
///
/// Derived from the address of a thread-local cell. Zero and `u32::MAX`
/// are reserved by the line prefix, so an id landing on either is remapped.
pub(crate) fn thread_id() -> u32 {
    THREAD_ID_CACHE.with(|cache| {
        let cached = cache.get();
        if cached != 0 {
            return cached;
        }

        let mut hasher = DefaultHasher::new();
        (cache as *const Cell<u32> as usize).hash(&mut hasher);
        let mut id = hasher.finish() as u32;
        if id == 0 || id == u32::MAX {
            id = 1;
        }

        cache.set(id);
        id
    })
}

/// One log record. Owned by the producer until enqueued, by a queue until
/// drained, then by the flusher until written.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Wall-clock milliseconds since the Unix epoch.
    pub ts_ms: i64,
    pub thread_id: u32,
    pub level: LogLevel,
    /// Already-formatted UTF-8 message, bounded by the engine's line limit.
    pub message: String,
}

impl LogEntry {
    /// Stamps the record on the producer's stack, truncating the message on
    /// a UTF-8 boundary when it exceeds `max_line_bytes`.
    pub fn new(level: LogLevel, message: &str, max_line_bytes: usize) -> Self {
        Self {
            ts_ms: Utc::now().timestamp_millis(),
            thread_id: thread_id(),
            level,
            message: utf8_truncate(message, max_line_bytes).to_owned(),
        }
    }
}

/// Longest prefix of `s` that fits in `max` bytes and ends on a codepoint
/// boundary. Never splits a multi-byte sequence.
#[must_use]
pub fn utf8_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }

    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
