//! Per-severity output descriptors
//!
//! Each severity owns one [`Sink`]. Levels without a configured path share
//! the fallback descriptor; file handles are reference-counted so a shared
//! descriptor is flushed and closed exactly once, and standard output is
//! never closed.

pub mod rotation;

use crate::core::error::{EngineError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A shareable output descriptor.
#[derive(Debug, Clone)]
pub enum SinkHandle {
    File(Arc<File>),
    Stdout,
}

impl SinkHandle {
    /// Open `path` in create/append mode.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| EngineError::sink_open(path.display().to_string(), e.to_string()))?;
        Ok(SinkHandle::File(Arc::new(file)))
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            SinkHandle::File(file) => file.is_terminal(),
            SinkHandle::Stdout => io::stdout().is_terminal(),
        }
    }

    /// One write attempt. A short count is reported back, not retried.
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkHandle::File(file) => (&**file).write(buf),
            SinkHandle::Stdout => io::stdout().lock().write(buf),
        }
    }

    /// Flush to stable storage; stdout only gets a stream flush.
    pub fn sync(&self) -> io::Result<()> {
        match self {
            SinkHandle::File(file) => file.sync_all(),
            SinkHandle::Stdout => io::stdout().lock().flush(),
        }
    }

    fn same_descriptor(&self, other: &SinkHandle) -> bool {
        match (self, other) {
            (SinkHandle::File(a), SinkHandle::File(b)) => Arc::ptr_eq(a, b),
            (SinkHandle::Stdout, SinkHandle::Stdout) => true,
            _ => false,
        }
    }
}

/// One severity's persistent output: descriptor, rotation bookkeeping, and
/// the TTY-gated color flag. Mutated only by the flusher.
#[derive(Debug)]
pub struct Sink {
    handle: SinkHandle,
    /// Path that owns rotation; `None` for fallback-routed sinks, and
    /// cleared when an open fails so rotation stops retrying.
    path: Option<PathBuf>,
    /// Bytes successfully written since the last rotation.
    bytes_written: u64,
    color_enabled: bool,
}

impl Sink {
    /// Open `path` for this level, or route to the shared fallback
    /// descriptor when `path` is unset or cannot be opened.
    pub fn open_or_fallback(
        path: Option<&Path>,
        fallback: &SinkHandle,
        enable_color: bool,
    ) -> Sink {
        match path {
            Some(p) => match SinkHandle::open(p) {
                Ok(handle) => {
                    let color_enabled = enable_color && handle.is_terminal();
                    Sink {
                        handle,
                        path: Some(p.to_path_buf()),
                        bytes_written: 0,
                        color_enabled,
                    }
                }
                Err(e) => {
                    eprintln!("[fanlog] {}; routing to fallback descriptor", e);
                    Sink::from_fallback(fallback, enable_color)
                }
            },
            None => Sink::from_fallback(fallback, enable_color),
        }
    }

    fn from_fallback(fallback: &SinkHandle, enable_color: bool) -> Sink {
        Sink {
            handle: fallback.clone(),
            path: None,
            bytes_written: 0,
            color_enabled: enable_color && fallback.is_terminal(),
        }
    }

    #[must_use]
    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rotate the backing file when writing `incoming` more bytes would
    /// reach the size threshold. Sinks without a path never rotate.
    pub fn maybe_rotate(&mut self, incoming: usize, max_file_size: u64, max_files: u32, enable_color: bool) {
        if max_file_size == 0 {
            return;
        }
        let Some(path) = self.path.clone() else {
            return;
        };
        if self.bytes_written + (incoming as u64) < max_file_size {
            return;
        }

        if let Err(e) = self.rotate(&path, max_files, enable_color) {
            eprintln!("[fanlog] {}; continuing on current descriptor", e);
            // reset the counter so the failed rotation is not retried on
            // every subsequent write
            self.bytes_written = 0;
        }
    }

    fn rotate(&mut self, path: &Path, max_files: u32, enable_color: bool) -> Result<()> {
        if let SinkHandle::File(file) = &self.handle {
            let _ = file.sync_all();
        }

        rotation::rotate_files(path, max_files)?;

        // sharers of the old descriptor keep appending to the renamed file;
        // this sink starts fresh
        let handle = SinkHandle::open(path)?;
        self.color_enabled = enable_color && handle.is_terminal();
        self.handle = handle;
        self.bytes_written = 0;
        Ok(())
    }

    /// Write one formatted block with the short-write policy: count what
    /// landed, drop the remainder, keep the sink open.
    pub fn write_block(&mut self, buf: &[u8]) {
        match self.handle.write(buf) {
            Ok(n) => {
                self.bytes_written += n as u64;
                if n < buf.len() {
                    eprintln!(
                        "[fanlog] short write on sink: {} of {} bytes",
                        n,
                        buf.len()
                    );
                }
            }
            Err(e) => eprintln!("[fanlog] sink write failed: {}", e),
        }
    }

    pub(crate) fn handle(&self) -> &SinkHandle {
        &self.handle
    }
}

/// Flush each unique descriptor exactly once. Shared descriptors compare by
/// identity, so two levels routed to the same file trigger a single sync.
pub fn sync_unique(sinks: &[Sink]) {
    let mut seen: Vec<&SinkHandle> = Vec::new();
    for sink in sinks {
        if seen.iter().any(|h| h.same_descriptor(sink.handle())) {
            continue;
        }
        if let Err(e) = sink.handle().sync() {
            eprintln!("[fanlog] sink sync failed: {}", e);
        }
        seen.push(sink.handle());
    }
}
