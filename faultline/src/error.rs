//! Error types for dispatch and its sinks

use faultline_common::classifier::{self, ErrorKind};
use faultline_common::event::ErrorEvent;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Error returned by a custom handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the log store
#[derive(Error, Debug)]
pub enum LogError {
    /// Directory could not be created
    #[error("Can't create log directory {path}: {source}")]
    CreateDir {
        /// Directory path
        path: PathBuf,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Path exists but is not a directory
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// Offending path
        path: PathBuf,
    },

    /// Appending to a log file failed
    #[error("Can't write log file {path}: {source}")]
    Write {
        /// Log file path
        path: PathBuf,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Reading a log file or directory failed
    #[error("Can't read {path}: {source}")]
    Read {
        /// File or directory path
        path: PathBuf,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// A stored record is not valid JSON
    #[error("Malformed log record in {path}: {source}")]
    Malformed {
        /// Log file path
        path: PathBuf,
        /// Source JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Record serialization failed
    #[error("Can't serialize log record: {source}")]
    Serialize {
        /// Source JSON error
        #[from]
        source: serde_json::Error,
    },
}

/// Errors raised by a mail transport
#[derive(Error, Debug)]
pub enum MailError {
    /// Transport program could not be started
    #[error("Can't start mail transport {program}: {source}")]
    Spawn {
        /// Program path
        program: PathBuf,
        /// Source IO error
        #[source]
        source: std::io::Error,
    },

    /// Writing the message to the transport failed
    #[error("Mail transport IO error: {source}")]
    Io {
        /// Source IO error
        #[from]
        source: std::io::Error,
    },

    /// Transport exited unsuccessfully
    #[error("Mail transport exited with {status}")]
    Status {
        /// Exit status
        status: ExitStatus,
    },
}

/// Failure of one sink invocation
#[derive(Error, Debug)]
pub enum SinkError {
    /// Mail or notify sink failed
    #[error("Mail sink failed: {0}")]
    Mail(#[from] MailError),

    /// Log sink failed
    #[error("Log sink failed: {0}")]
    Log(#[from] LogError),

    /// Custom handler returned an error
    #[error("Custom handler failed: {0}")]
    Handler(#[source] HandlerError),
}

/// Typed error raised for a severity covered by a throw policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message} in {file}:{line}")]
pub struct SeverityError {
    /// Error kind mapped from the severity
    pub kind: ErrorKind,
    /// Raw severity code
    pub severity: u32,
    /// Original message
    pub message: String,
    /// Source file
    pub file: String,
    /// Source line
    pub line: u32,
}

impl SeverityError {
    /// Build the error a throw policy raises for `event`.
    pub fn from_event(event: &ErrorEvent) -> Self {
        Self {
            kind: classifier::error_kind(event.severity),
            severity: event.severity,
            message: event.message.clone(),
            file: event.location.file.clone(),
            line: event.location.line,
        }
    }
}

/// Errors propagated out of `DispatchEngine::handle`
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A throw policy matched
    #[error(transparent)]
    Severity(#[from] SeverityError),

    /// Log sink failure (hard)
    #[error("Log sink failed: {0}")]
    Log(#[from] LogError),

    /// Custom handler failure
    #[error("Custom handler failed: {0}")]
    Handler(#[source] HandlerError),
}

impl From<SinkError> for DispatchError {
    fn from(err: SinkError) -> Self {
        match err {
            // Mail and notify sinks are soft; their failures are only logged
            // and never reach this conversion from the engine.
            SinkError::Mail(e) => Self::Handler(Box::new(e)),
            SinkError::Log(e) => Self::Log(e),
            SinkError::Handler(e) => Self::Handler(e),
        }
    }
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
