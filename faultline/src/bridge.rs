//! Forwards the host's unreported fatal last error into the engine.
//!
//! Fatal errors can terminate the host before its error hook runs. At
//! shutdown the engine asks the bridge for the host's last error and, if it
//! is fatal, dispatches it like any other event. The bridge fires at most
//! once until reset.

use crate::host::Host;
use faultline_common::event::ErrorEvent;
use tracing::debug;

#[derive(Debug, Default)]
pub struct FatalBridge {
    forwarded: bool,
}

impl FatalBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event to forward for the host's last error, if there is one to forward.
    ///
    /// Only the first call after construction or [`reset`](Self::reset)
    /// consults the host; later calls return `None`. Non-fatal last errors
    /// were already reported through the error hook and are skipped.
    pub fn take_event(&mut self, host: &impl Host) -> Option<ErrorEvent> {
        if self.forwarded {
            return None;
        }
        self.forwarded = true;

        let last = host.last_error()?;
        if !faultline_common::classifier::is_fatal(last.severity) {
            debug!(severity = last.severity, "last error is not fatal, nothing to forward");
            return None;
        }
        Some(ErrorEvent::new(last.severity, last.message, last.file, last.line))
    }

    pub fn has_forwarded(&self) -> bool {
        self.forwarded
    }

    pub fn reset(&mut self) {
        self.forwarded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LastError, ProcessHost};
    use faultline_common::severity::SeverityKind;

    fn last(kind: SeverityKind) -> LastError {
        LastError {
            severity: kind.code(),
            message: "boom".into(),
            file: "main.rs".into(),
            line: 42,
        }
    }

    #[test]
    fn no_last_error_forwards_nothing() {
        let host = ProcessHost::new();
        let mut bridge = FatalBridge::new();
        assert!(bridge.take_event(&host).is_none());
        assert!(bridge.has_forwarded());
    }

    #[test]
    fn fatal_last_error_forwarded_once() {
        let host = ProcessHost::new();
        host.record_error(last(SeverityKind::CoreError));
        let mut bridge = FatalBridge::new();

        let event = bridge.take_event(&host).unwrap();
        assert_eq!(event.severity, SeverityKind::CoreError.code());
        assert_eq!(event.location.line, 42);
        assert!(event.context.is_empty());
        assert!(event.backtrace.is_empty());

        assert!(bridge.take_event(&host).is_none());
        bridge.reset();
        assert!(bridge.take_event(&host).is_some());
    }

    #[test]
    fn non_fatal_last_error_is_skipped() {
        let host = ProcessHost::new();
        host.record_error(last(SeverityKind::Warning));
        let mut bridge = FatalBridge::new();
        assert!(bridge.take_event(&host).is_none());
    }
}
