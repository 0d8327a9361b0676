//! Notify-only mail sink.

use super::{DispatchContext, FailureMode, Sink};
use crate::error::SinkError;
use crate::mail::MailFormatter;
use faultline_common::event::ErrorEvent;

/// Sends the severity description only: no detail table, no snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySink {
    to: String,
}

impl NotifySink {
    pub fn new(to: impl Into<String>) -> Self {
        Self { to: to.into() }
    }

    pub fn address(&self) -> &str {
        &self.to
    }
}

impl Sink for NotifySink {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn target(&self) -> String {
        self.to.clone()
    }

    fn failure(&self) -> FailureMode {
        FailureMode::Soft
    }

    fn dispatch(&self, event: &ErrorEvent, ctx: &DispatchContext<'_>) -> Result<(), SinkError> {
        let message = MailFormatter::new(ctx.subject, ctx.at).notify(&self.to, &event.describe());
        ctx.transport.send(&message)?;
        Ok(())
    }
}
