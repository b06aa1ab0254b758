//! Error types for the logger system

use std::io;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[cfg(unix)]
const INVALID_DESCRIPTOR_CODES: &[i32] = &[9 /* EBADF */, 22 /* EINVAL */];

#[cfg(windows)]
const INVALID_DESCRIPTOR_CODES: &[i32] = &[6 /* ERROR_INVALID_HANDLE */];

#[cfg(not(any(unix, windows)))]
const INVALID_DESCRIPTOR_CODES: &[i32] = &[];

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Flushing buffered records failed
    #[error("failed to sync logger: {source}")]
    Sync {
        #[source]
        source: Box<LoggerError>,
    },

    /// Logger already stopped
    #[error("Logger already stopped")]
    LoggerStopped,

    /// Channel send error
    #[error("Failed to send log record to async worker")]
    ChannelSendError,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn sync(source: LoggerError) -> Self {
        LoggerError::Sync {
            source: Box::new(source),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// The underlying IO error, if this error wraps one
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            LoggerError::IoOperation { source, .. } => Some(source),
            LoggerError::IoError(err) => Some(err),
            LoggerError::Sync { source } => source.io_source(),
            _ => None,
        }
    }

    /// Whether this error reports a closed or invalid file descriptor.
    ///
    /// Flushing a standard stream that is a terminal, a pipe that was already
    /// torn down, or a descriptor closed behind our back fails this way.
    pub fn is_invalid_descriptor(&self) -> bool {
        self.io_source()
            .and_then(io::Error::raw_os_error)
            .is_some_and(|code| INVALID_DESCRIPTOR_CODES.contains(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("Environment", "unknown environment type: STAGING");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::sync(LoggerError::other("disk full"));
        assert!(matches!(err, LoggerError::Sync { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("LogLevel", "unknown log level: LOUD");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LogLevel: unknown log level: LOUD"
        );

        let err = LoggerError::sync(LoggerError::other("disk full"));
        assert_eq!(err.to_string(), "failed to sync logger: disk full");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("flushing stdout", "cannot flush", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("flushing stdout"));
        assert!(err.io_source().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_descriptor_detection() {
        let einval = LoggerError::from(io::Error::from_raw_os_error(22));
        assert!(einval.is_invalid_descriptor());

        let ebadf = LoggerError::io_operation("flush", "closed", io::Error::from_raw_os_error(9));
        assert!(ebadf.is_invalid_descriptor());

        // ENOSPC
        let enospc = LoggerError::from(io::Error::from_raw_os_error(28));
        assert!(!enospc.is_invalid_descriptor());

        let other = LoggerError::other("disk full");
        assert!(!other.is_invalid_descriptor());
    }
}
