//! Batch formatting into per-level output buffers
//!
//! The flusher appends every drained entry to the buffer for its level,
//! then writes each non-empty buffer to its sink in one block.

use super::entry::LogEntry;
use super::level::COLOR_RESET;
use chrono::{Local, TimeZone};
use std::io::Write as _;

/// `YYYY-MM-DD HH:MM:SS.mmm` in the system's local time zone.
#[must_use]
pub fn format_timestamp(ts_ms: i64) -> String {
    match Local.timestamp_millis_opt(ts_ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => "0000-00-00 00:00:00.000".to_string(),
    }
}

/// Appends `[timestamp][thread][L] message\n`, wrapped in ANSI color codes
/// when `color` is set. The newline sits inside the color span so the reset
/// lands on the same output line.
pub fn append_text_line(out: &mut Vec<u8>, entry: &LogEntry, color: bool) {
    if color {
        out.extend_from_slice(entry.level.color_prefix().as_bytes());
    }

    let _ = write!(
        out,
        "[{}][{}][{}] ",
        format_timestamp(entry.ts_ms),
        entry.thread_id,
        entry.level.short_name()
    );
    out.extend_from_slice(entry.message.as_bytes());
    out.push(b'\n');

    if color {
        out.extend_from_slice(COLOR_RESET.as_bytes());
    }
}

/// Appends one JSON line with fixed key order:
/// `{"time":"…","thread":N,"level":"L","msg":"…"}\n`.
pub fn append_json_line(out: &mut Vec<u8>, entry: &LogEntry) {
    let _ = write!(
        out,
        "{{\"time\":\"{}\",\"thread\":{},\"level\":\"{}\",\"msg\":\"",
        format_timestamp(entry.ts_ms),
        entry.thread_id,
        entry.level.short_name()
    );
    escape_json_into(out, &entry.message);
    out.extend_from_slice(b"\"}\n");
}

/// Escapes `"` `\` `\n` `\r` `\t`; all other bytes pass through verbatim.
pub fn escape_json_into(out: &mut Vec<u8>, s: &str) {
    for &b in s.as_bytes() {
        match b {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            _ => out.push(b),
        }
    }
}
