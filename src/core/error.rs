//! Error types for the engine
//!
//! The producer API never surfaces these; they flow through sink open and
//! rotation internals and are recovered locally by the flusher.

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A sink path could not be opened
    #[error("cannot open sink '{path}': {message}")]
    SinkOpen { path: String, message: String },

    /// File rotation failed
    #[error("rotation failed for '{path}': {message}")]
    Rotation { path: String, message: String },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    pub fn sink_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::SinkOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Rotation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::sink_open("/var/log/app.log", "permission denied");
        assert_eq!(
            err.to_string(),
            "cannot open sink '/var/log/app.log': permission denied"
        );

        let err = EngineError::rotation("/var/log/app.log", "disk full");
        assert_eq!(
            err.to_string(),
            "rotation failed for '/var/log/app.log': disk full"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: EngineError = io_err.into();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
