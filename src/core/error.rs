//! Error types for the dispatch pipeline

use super::lifecycle::{WorkerEvent, WorkerState};

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A level token outside the eight known severities
    #[error("Invalid severity '{value}': expected one of ALERT, CRITICAL, DEBUG, EMERGENCY, ERROR, INFO, NOTICE, WARNING")]
    InvalidSeverity { value: String },

    /// Client used before a queue was attached
    #[error("Client '{client}' is not bound to a log queue")]
    NotBound { client: String },

    /// Worker started without one of its collaborators
    #[error("Worker cannot start: {dependency} not set")]
    MissingDependency { dependency: &'static str },

    /// Lifecycle event not allowed in the current worker state
    #[error("Worker cannot handle {event} while {state}")]
    InvalidState {
        state: WorkerState,
        event: WorkerEvent,
    },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Worker thread panicked before it could finish
    #[error("Dispatch worker thread panicked")]
    WorkerPanicked,

    /// Channel send error
    #[error("Failed to push log item onto the queue")]
    ChannelSendError,

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),
}

impl LoggerError {
    /// Create an invalid severity error for the rejected token
    pub fn invalid_severity(value: impl Into<String>) -> Self {
        LoggerError::InvalidSeverity {
            value: value.into(),
        }
    }

    /// Create a not-bound error for the named client
    pub fn not_bound(client: impl Into<String>) -> Self {
        LoggerError::NotBound {
            client: client.into(),
        }
    }

    /// Create a missing dependency error
    pub fn missing_dependency(dependency: &'static str) -> Self {
        LoggerError::MissingDependency { dependency }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
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

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// True for the programmer errors raised at validation boundaries
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidSeverity { .. }
                | LoggerError::NotBound { .. }
                | LoggerError::MissingDependency { .. }
                | LoggerError::InvalidState { .. }
        )
    }
}
