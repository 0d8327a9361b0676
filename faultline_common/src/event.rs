//! The error event handed to the dispatch engine.

use crate::classifier;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form context captured alongside an error.
pub type Context = Map<String, Value>;

/// Where the error was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

/// One reported error.
///
/// Created when the host reports an error and consumed synchronously by
/// the dispatch engine. Only its serialized forms are ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Raw severity code as reported by the host.
    pub severity: u32,
    pub message: String,
    pub location: SourceLocation,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub backtrace: String,
}

impl ErrorEvent {
    /// Event with empty context and backtrace.
    pub fn new(severity: u32, message: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            severity,
            message: message.into(),
            location: SourceLocation {
                file: file.into(),
                line,
            },
            context: Context::new(),
            backtrace: String::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = backtrace.into();
        self
    }

    /// Classifier description of this event's severity.
    pub fn describe(&self) -> String {
        classifier::describe(self.severity)
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        classifier::is_fatal(self.severity)
    }
}
