//! Engine configuration, immutable after init

use super::level::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Nominal flusher period (2 ms).
pub const DEFAULT_FLUSH_INTERVAL_NS: u64 = 2_000_000;
/// Default primary ring capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16_384;
/// Default batch drain limit.
pub const DEFAULT_BATCH_SIZE: usize = 512;
/// Upper clamp for `batch_size`.
pub const MAX_BATCH_SIZE: usize = 4096;
/// Default per-record message bound (64 KiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 64 * 1024;
/// Fallback queue capacity as a multiple of the primary ring capacity.
pub const FALLBACK_CAPACITY_FACTOR: usize = 4;

/// Engine configuration. Unset paths route that level to the fallback
/// descriptor (the info file when one is configured, else stdout).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub trace_path: Option<PathBuf>,
    pub debug_path: Option<PathBuf>,
    pub info_path: Option<PathBuf>,
    pub warn_path: Option<PathBuf>,
    pub error_path: Option<PathBuf>,
    pub critical_path: Option<PathBuf>,
    pub fatal_path: Option<PathBuf>,

    /// Flusher sleep between batches, in nanoseconds.
    pub flush_interval_ns: u64,
    /// Primary ring capacity.
    pub queue_capacity: usize,
    /// Max entries drained per flush; clamped to `1..=MAX_BATCH_SIZE`.
    pub batch_size: usize,
    /// TTY-gated ANSI color.
    pub enable_color_stdout: bool,
    /// Rotation threshold in bytes; 0 disables rotation.
    pub max_file_size_bytes: u64,
    /// Rotated generations to keep (`path.1` .. `path.K`).
    pub max_files: u32,
    /// Emit JSON lines instead of text.
    pub json_mode: bool,
    /// Enable the overflow/backpressure counters.
    pub track_metrics: bool,
    /// Per-record message bound; longer messages are truncated on a UTF-8
    /// boundary.
    pub max_line_bytes: usize,
    /// Spawn the built-in flusher thread. Disable when an external runtime
    /// drives `flusher_task` (or `flush_once_batch`) itself.
    pub spawn_flush_thread: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace_path: None,
            debug_path: None,
            info_path: None,
            warn_path: None,
            error_path: None,
            critical_path: None,
            fatal_path: None,
            flush_interval_ns: DEFAULT_FLUSH_INTERVAL_NS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            enable_color_stdout: true,
            max_file_size_bytes: 0,
            max_files: 3,
            json_mode: false,
            track_metrics: false,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            spawn_flush_thread: true,
        }
    }
}

impl Config {
    /// The configured path for `level`, if any.
    #[must_use]
    pub fn path_for(&self, level: LogLevel) -> Option<&Path> {
        let path = match level {
            LogLevel::Trace => &self.trace_path,
            LogLevel::Debug => &self.debug_path,
            LogLevel::Info => &self.info_path,
            LogLevel::Warn => &self.warn_path,
            LogLevel::Error => &self.error_path,
            LogLevel::Critical => &self.critical_path,
            LogLevel::Fatal => &self.fatal_path,
        };
        path.as_deref()
    }

    pub(crate) fn clamped_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }

    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_nanos(self.flush_interval_ns)
    }
}
