//! # fanlog
//!
//! An asynchronous, multi-producer logging engine with per-severity sinks.
//!
//! ## Features
//!
//! - **Non-blocking producers**: a lock-free bounded ring on the hot path,
//!   a mutex-protected rescue queue when the ring is full
//! - **Batched flushing**: a single flusher drains both queues, formats per
//!   level, and writes each level's block to its sink
//! - **Per-severity sinks**: seven levels, optional per-level files, shared
//!   fallback descriptor, TTY-gated ANSI color
//! - **Size-based rotation**: `path.1` .. `path.K` generations
//! - **Text or JSON lines**: fixed-key JSON mode for log shippers
//!
//! ## Usage
//!
//! ```no_run
//! use fanlog::{info, Config};
//!
//! fanlog::init(Config {
//!     info_path: Some("app.log".into()),
//!     ..Default::default()
//! });
//!
//! info!("server listening on port {}", 8080);
//!
//! fanlog::shutdown();
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Config, Engine, EngineError, EngineMetrics, LogEntry, LogLevel, Result,
    };
}

pub use crate::core::{
    enqueue, utf8_truncate, Config, Engine, EngineError, EngineMetrics, LogEntry, LogLevel,
    Result,
};
#[cfg(feature = "async-flush")]
pub use crate::core::flusher_task;

/// Open the sinks and publish the process-wide engine. No-op while an
/// engine is already live.
pub fn init(config: Config) {
    Engine::init(config);
}

/// Drain both queues, close every unique descriptor, and unpublish the
/// engine.
pub fn shutdown() {
    Engine::shutdown();
}
