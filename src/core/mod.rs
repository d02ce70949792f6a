//! Core engine types: entries, queues, configuration, and lifecycle

pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod fallback;
#[cfg(feature = "async-flush")]
pub mod flush_task;
pub mod format;
pub mod level;
pub mod metrics;
pub mod ring;

pub use config::{
    Config, DEFAULT_BATCH_SIZE, DEFAULT_FLUSH_INTERVAL_NS, DEFAULT_MAX_LINE_BYTES,
    DEFAULT_QUEUE_CAPACITY, FALLBACK_CAPACITY_FACTOR, MAX_BATCH_SIZE,
};
pub use engine::{enqueue, Engine};
pub use entry::{utf8_truncate, LogEntry};
pub use error::{EngineError, Result};
pub use fallback::FallbackQueue;
#[cfg(feature = "async-flush")]
pub use flush_task::flusher_task;
pub use level::{LogLevel, COLOR_RESET, LEVEL_COUNT};
pub use metrics::EngineMetrics;
pub use ring::PrimaryRing;
