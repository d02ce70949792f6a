//! Level-facade macros
//!
//! Format the message at the call site and hand the finished UTF-8 string
//! to the engine. When no engine is initialized the record is dropped
//! silently, so these are safe to sprinkle before `init`.
//!
//! # Examples
//!
//! ```
//! use fanlog::{info, warn};
//!
//! // drops silently: no engine initialized in this doctest
//! info!("server listening on port {}", 8080);
//! warn!("slow request: {} ms", 17.4);
//! ```

/// Log a message at an explicit level.
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        $crate::enqueue($level, &format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warn-level message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::log!($crate::LogLevel::Fatal, $($arg)+)
    };
}
