//! Custom callback sink.

use super::{DispatchContext, FailureMode, Sink};
use crate::error::{HandlerError, SinkError};
use faultline_common::event::ErrorEvent;
use std::fmt;

/// Callback invoked for one exact severity.
pub type CustomHandler = Box<dyn Fn(&ErrorEvent) -> Result<(), HandlerError>>;

/// Wraps a custom handler. Its presence supersedes the throw decision.
pub struct CustomSink {
    severity: u32,
    handler: CustomHandler,
}

impl CustomSink {
    pub fn new(severity: u32, handler: CustomHandler) -> Self {
        Self { severity, handler }
    }

    pub fn severity(&self) -> u32 {
        self.severity
    }
}

impl fmt::Debug for CustomSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomSink")
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl Sink for CustomSink {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn target(&self) -> String {
        self.severity.to_string()
    }

    fn failure(&self) -> FailureMode {
        FailureMode::Hard
    }

    fn dispatch(&self, event: &ErrorEvent, _ctx: &DispatchContext<'_>) -> Result<(), SinkError> {
        (self.handler)(event).map_err(SinkError::Handler)
    }
}
