//! Engine lifecycle, producer fast path, and the batched flusher
//!
//! The engine is process-wide: one publish-once atomic pointer, explicit
//! `init`/`shutdown`, no lazy construction. Producers reach it through
//! [`Engine::try_instance`] and never block except the last-resort spin
//! when both queues refuse an entry.

use super::config::{Config, FALLBACK_CAPACITY_FACTOR};
use super::entry::LogEntry;
use super::fallback::FallbackQueue;
use super::format;
use super::level::{LogLevel, LEVEL_COUNT};
use super::metrics::EngineMetrics;
use super::ring::PrimaryRing;
use crate::sinks::{self, Sink, SinkHandle};
use parking_lot::{Condvar, Mutex};
use std::hint;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::thread;
use std::time::Duration;

static ENGINE: AtomicPtr<Engine> = AtomicPtr::new(ptr::null_mut());

/// Flusher-owned state. Everything that touches sinks sits behind this one
/// mutex; `try_lock` gives the at-most-one-flusher rule, and kickers that
/// lose the race return without flushing.
struct FlushState {
    /// One sink per severity; emptied once shutdown has closed them.
    sinks: Vec<Sink>,
    scratch: Vec<LogEntry>,
    level_bufs: Vec<Vec<u8>>,
}

pub struct Engine {
    ring: PrimaryRing,
    fallback: FallbackQueue,
    flush_state: Mutex<FlushState>,
    flusher_handle: Mutex<Option<thread::JoinHandle<()>>>,
    park_mutex: Mutex<()>,
    park_condvar: Condvar,

    batch_size: usize,
    flush_interval: Duration,
    max_file_size_bytes: u64,
    max_files: u32,
    max_line_bytes: usize,
    enable_color_stdout: bool,
    json_mode: bool,
    track_metrics: bool,

    shutting_down: AtomicBool,
    flusher_started: AtomicBool,
    metrics: EngineMetrics,
}

/// Producer entry point: hand the engine a formatted message. Drops
/// silently when no engine is live or shutdown has begun.
pub fn enqueue(level: LogLevel, message: &str) {
    if let Some(engine) = Engine::try_instance() {
        engine.log(level, message);
    }
}

impl Engine {
    /// Open all sinks, publish the engine, and start the built-in flush
    /// driver. A second call while an engine is live is a no-op.
    pub fn init(config: Config) {
        if !ENGINE.load(Ordering::Acquire).is_null() {
            return;
        }

        let spawn_thread = config.spawn_flush_thread;
        let ptr = Box::into_raw(Box::new(Engine::build(&config)));

        if ENGINE
            .compare_exchange(ptr::null_mut(), ptr, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // lost the publication race; this engine was never visible
            unsafe { drop(Box::from_raw(ptr)) };
            return;
        }

        if spawn_thread {
            let engine: &'static Engine = unsafe { &*ptr };
            let spawned = thread::Builder::new()
                .name("fanlog-flusher".into())
                .spawn(move || engine.run_flusher());
            match spawned {
                Ok(handle) => *engine.flusher_handle.lock() = Some(handle),
                Err(e) => eprintln!("[fanlog] cannot spawn flusher thread: {}", e),
            }
        }
    }

    /// Stop intake, drain both queues, close every unique descriptor, and
    /// unpublish the engine.
    pub fn shutdown() {
        let ptr = ENGINE.load(Ordering::Acquire);
        if ptr.is_null() {
            return;
        }
        let engine: &'static Engine = unsafe { &*ptr };

        engine.shutting_down.store(true, Ordering::Release);
        {
            let _parked = engine.park_mutex.lock();
            engine.park_condvar.notify_all();
        }
        if let Some(handle) = engine.flusher_handle.lock().take() {
            if handle.join().is_err() {
                eprintln!("[fanlog] flusher thread panicked during shutdown");
            }
        }

        // entries already accepted are drained; new ones are refused by the
        // shutting_down gate
        loop {
            engine.flush_once_batch();
            if engine.ring.is_empty() && engine.fallback.is_empty() {
                break;
            }
            hint::spin_loop();
        }

        {
            let mut state = engine.flush_state.lock();
            sinks::sync_unique(&state.sinks);
            state.sinks.clear();
        }

        ENGINE.store(ptr::null_mut(), Ordering::Release);
        // the engine shell is never freed: stale references held by late
        // producers stay valid and observe the shutdown gate
    }

    /// Acquire-load of the published engine, if any.
    #[must_use]
    pub fn try_instance() -> Option<&'static Engine> {
        let ptr = ENGINE.load(Ordering::Acquire);
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { &*ptr })
        }
    }

    fn build(config: &Config) -> Engine {
        // fallback descriptor: the info file when one opens, else stdout
        let base = match config.info_path.as_deref() {
            Some(path) => SinkHandle::open(path).unwrap_or_else(|e| {
                eprintln!("[fanlog] {}; using stdout as fallback descriptor", e);
                SinkHandle::Stdout
            }),
            None => SinkHandle::Stdout,
        };

        let sinks: Vec<Sink> = LogLevel::ALL
            .iter()
            .map(|&level| {
                Sink::open_or_fallback(config.path_for(level), &base, config.enable_color_stdout)
            })
            .collect();

        let batch_size = config.clamped_batch_size();
        let queue_capacity = config.queue_capacity.max(1);

        Engine {
            ring: PrimaryRing::with_capacity(queue_capacity),
            fallback: FallbackQueue::with_capacity(queue_capacity * FALLBACK_CAPACITY_FACTOR),
            flush_state: Mutex::new(FlushState {
                sinks,
                scratch: Vec::with_capacity(batch_size),
                level_bufs: (0..LEVEL_COUNT).map(|_| Vec::new()).collect(),
            }),
            flusher_handle: Mutex::new(None),
            park_mutex: Mutex::new(()),
            park_condvar: Condvar::new(),
            batch_size,
            flush_interval: config.flush_interval(),
            max_file_size_bytes: config.max_file_size_bytes,
            max_files: config.max_files,
            max_line_bytes: config.max_line_bytes,
            enable_color_stdout: config.enable_color_stdout,
            json_mode: config.json_mode,
            track_metrics: config.track_metrics,
            shutting_down: AtomicBool::new(false),
            flusher_started: AtomicBool::new(false),
            metrics: EngineMetrics::new(),
        }
    }

    /// Producer fast path. Never returns an error; at most one copy of the
    /// entry lands in exactly one of the two queues.
    pub fn log(&self, level: LogLevel, message: &str) {
        if self.shutting_down.load(Ordering::Acquire) {
            return;
        }
        let entry = LogEntry::new(level, message, self.max_line_bytes);
        self.push_entry(entry);
    }

    fn push_entry(&self, entry: LogEntry) {
        let entry = match self.ring.try_enqueue(entry) {
            Ok(()) => {
                self.kick_if_unstarted();
                return;
            }
            Err(entry) => entry,
        };

        let mut entry = match self.fallback.try_push(entry) {
            Ok(()) => {
                if self.track_metrics {
                    self.metrics.record_overflow();
                }
                self.kick_if_unstarted();
                return;
            }
            Err(entry) => entry,
        };

        // both queues refused; spin until the primary ring accepts
        if self.track_metrics {
            self.metrics.record_backpressure();
        }
        loop {
            match self.ring.try_enqueue(entry) {
                Ok(()) => break,
                Err(rejected) => {
                    entry = rejected;
                    // with no flusher scheduled yet nothing drains behind
                    // us, so the kicker doubles as the drain
                    self.kick_if_unstarted();
                    hint::spin_loop();
                }
            }
        }
    }

    #[inline]
    fn kick_if_unstarted(&self) {
        if !self.flusher_started.load(Ordering::Acquire) {
            self.flush_once_batch();
        }
    }

    /// One batch drain: primary ring first, topped up from the fallback
    /// queue, formatted per level, rotated and written per sink. Serialized
    /// internally; a concurrent caller returns without flushing.
    pub fn flush_once_batch(&self) {
        let Some(mut state) = self.flush_state.try_lock() else {
            return;
        };
        self.flush_locked(&mut state);
    }

    fn flush_locked(&self, state: &mut FlushState) {
        if state.sinks.is_empty() {
            return;
        }
        let FlushState {
            sinks,
            scratch,
            level_bufs,
        } = state;

        scratch.clear();
        let drained = self.ring.try_dequeue_bulk(scratch, self.batch_size);
        if drained < self.batch_size {
            self.fallback.drain_into(scratch, self.batch_size - drained);
        }
        if scratch.is_empty() {
            return;
        }

        for buf in level_bufs.iter_mut() {
            buf.clear();
        }
        for entry in scratch.iter() {
            let idx = entry.level.index();
            if self.json_mode {
                format::append_json_line(&mut level_bufs[idx], entry);
            } else {
                format::append_text_line(&mut level_bufs[idx], entry, sinks[idx].color_enabled());
            }
        }

        for (idx, buf) in level_bufs.iter().enumerate() {
            if buf.is_empty() {
                continue;
            }
            let sink = &mut sinks[idx];
            sink.maybe_rotate(
                buf.len(),
                self.max_file_size_bytes,
                self.max_files,
                self.enable_color_stdout,
            );
            sink.write_block(buf);
        }
    }

    fn run_flusher(&self) {
        self.mark_flusher_started();
        loop {
            self.flush_once_batch();
            if self.shutting_down.load(Ordering::Acquire) {
                break;
            }
            let mut parked = self.park_mutex.lock();
            if !self.shutting_down.load(Ordering::Acquire) {
                self.park_condvar
                    .wait_for(&mut parked, self.flush_interval);
            }
        }
    }

    /// External flush drivers call this once when they take over; producers
    /// stop kicking afterwards.
    pub fn mark_flusher_started(&self) {
        self.flusher_started.store(true, Ordering::Release);
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    #[must_use]
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Entries that took the fallback path.
    #[must_use]
    pub fn overflow_events(&self) -> u64 {
        self.metrics.overflow_events()
    }

    /// Final-resort spins while both queues were full.
    #[must_use]
    pub fn backpressure_spins(&self) -> u64 {
        self.metrics.backpressure_spins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex as StdMutex;
    use tempfile::tempdir;

    // the engine is process-wide; lifecycle tests must not interleave
    static LIFECYCLE: StdMutex<()> = StdMutex::new(());

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        LIFECYCLE.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_enqueue_without_engine_is_silent() {
        let _guard = lock();
        assert!(Engine::try_instance().is_none());
        enqueue(LogLevel::Info, "nobody home");
    }

    #[test]
    fn test_init_log_shutdown_cycle() {
        let _guard = lock();
        let dir = tempdir().unwrap();
        let info = dir.path().join("info.log");

        Engine::init(Config {
            info_path: Some(info.clone()),
            spawn_flush_thread: false,
            ..Default::default()
        });
        assert!(Engine::try_instance().is_some());

        // re-init while live is a no-op
        Engine::init(Config::default());

        for i in 0..10 {
            enqueue(LogLevel::Info, &format!("cycle {}", i));
        }
        Engine::shutdown();

        assert!(Engine::try_instance().is_none());
        let content = fs::read_to_string(&info).unwrap();
        assert_eq!(content.lines().count(), 10);
        assert!(content.contains("][I] cycle 9"));
    }

    #[test]
    fn test_post_shutdown_enqueue_drops() {
        let _guard = lock();
        let dir = tempdir().unwrap();
        let info = dir.path().join("info.log");

        Engine::init(Config {
            info_path: Some(info.clone()),
            spawn_flush_thread: false,
            ..Default::default()
        });
        enqueue(LogLevel::Info, "kept");
        Engine::shutdown();
        enqueue(LogLevel::Info, "lost");

        let content = fs::read_to_string(&info).unwrap();
        assert!(content.contains("kept"));
        assert!(!content.contains("lost"));
    }

    #[test]
    fn test_levels_route_to_their_sinks() {
        let _guard = lock();
        let dir = tempdir().unwrap();
        let info = dir.path().join("info.log");
        let errors = dir.path().join("error.log");

        Engine::init(Config {
            info_path: Some(info.clone()),
            error_path: Some(errors.clone()),
            spawn_flush_thread: false,
            ..Default::default()
        });
        enqueue(LogLevel::Info, "plain");
        enqueue(LogLevel::Error, "bad");
        // warn has no path and lands on the fallback descriptor (info file)
        enqueue(LogLevel::Warn, "careful");
        Engine::shutdown();

        let info_content = fs::read_to_string(&info).unwrap();
        let error_content = fs::read_to_string(&errors).unwrap();
        assert!(info_content.contains("][I] plain"));
        assert!(info_content.contains("][W] careful"));
        assert!(error_content.contains("][E] bad"));
        assert!(!error_content.contains("plain"));
    }
}
