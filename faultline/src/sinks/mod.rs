//! Dispatch sinks.
//!
//! Each registered policy owns one typed sink. The engine asks the
//! registry for the sinks matching an event, in notify → mail → log order,
//! and calls [`Sink::dispatch`] on each. A sink's [`FailureMode`] decides
//! whether its failure is swallowed or propagated.

pub mod custom;
pub mod log;
pub mod mail;
pub mod notify;

pub use custom::{CustomHandler, CustomSink};
pub use log::LogSink;
pub use mail::MailSink;
pub use notify::NotifySink;

use crate::error::SinkError;
use crate::mail::MailTransport;
use chrono::{DateTime, Local};
use faultline_common::event::ErrorEvent;
use std::collections::BTreeMap;

/// How a failed dispatch affects the rest of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Logged and ignored; dispatch continues.
    Soft,
    /// Propagated to the caller of `handle`.
    Hard,
}

/// Everything a sink may need beyond the event itself.
pub struct DispatchContext<'a> {
    pub transport: &'a dyn MailTransport,
    pub subject: &'a str,
    pub snapshot: &'a BTreeMap<String, String>,
    pub at: DateTime<Local>,
}

/// Side-effecting destination for error events.
pub trait Sink {
    /// Short sink identifier ("notify", "mail", "log", "custom").
    fn name(&self) -> &'static str;

    /// Destination identity, used to deliver at most once per event.
    fn target(&self) -> String;

    fn failure(&self) -> FailureMode;

    fn dispatch(&self, event: &ErrorEvent, ctx: &DispatchContext<'_>) -> Result<(), SinkError>;
}
