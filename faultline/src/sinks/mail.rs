//! Full-report mail sink.

use super::{DispatchContext, FailureMode, Sink};
use crate::error::SinkError;
use crate::mail::MailFormatter;
use faultline_common::event::ErrorEvent;

/// Sends the full report: detail table plus the ambient snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSink {
    to: String,
}

impl MailSink {
    pub fn new(to: impl Into<String>) -> Self {
        Self { to: to.into() }
    }

    pub fn address(&self) -> &str {
        &self.to
    }
}

impl Sink for MailSink {
    fn name(&self) -> &'static str {
        "mail"
    }

    fn target(&self) -> String {
        self.to.clone()
    }

    fn failure(&self) -> FailureMode {
        FailureMode::Soft
    }

    fn dispatch(&self, event: &ErrorEvent, ctx: &DispatchContext<'_>) -> Result<(), SinkError> {
        let message = MailFormatter::new(ctx.subject, ctx.at).full(&self.to, event, ctx.snapshot);
        ctx.transport.send(&message)?;
        Ok(())
    }
}
