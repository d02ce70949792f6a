//! Severity levels and their routing metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of severity levels; sinks and per-level buffers are indexed by it.
pub const LEVEL_COUNT: usize = 7;

/// ANSI reset emitted after a colorized line.
pub const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Critical = 5,
    Fatal = 6,
}

impl LogLevel {
    /// All levels in severity order, for iterating sinks.
    pub const ALL: [LogLevel; LEVEL_COUNT] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Fatal,
    ];

    /// Index into per-level sink and buffer arrays.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-character name used in the line prefix and JSON `level` field.
    #[must_use]
    pub fn short_name(self) -> char {
        match self {
            LogLevel::Trace => 'T',
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warn => 'W',
            LogLevel::Error => 'E',
            LogLevel::Critical => 'C',
            LogLevel::Fatal => 'F',
        }
    }

    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// ANSI color prefix for this level; pair with [`COLOR_RESET`].
    #[must_use]
    pub fn color_prefix(self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[90m",    // gray
            LogLevel::Debug => "\x1b[36m",    // cyan
            LogLevel::Info => "\x1b[32m",     // green
            LogLevel::Warn => "\x1b[33m",     // yellow
            LogLevel::Error => "\x1b[31m",    // red
            LogLevel::Critical => "\x1b[91m", // bright red
            LogLevel::Fatal => "\x1b[95m",    // bright magenta
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
