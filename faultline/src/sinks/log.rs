//! Log file sink.

use super::{DispatchContext, FailureMode, Sink};
use crate::error::SinkError;
use crate::log_store::LogStore;
use faultline_common::event::ErrorEvent;
use tracing::debug;

/// Appends a record to the day-rotated log under its root. Failures are hard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSink {
    store: LogStore,
}

impl LogSink {
    pub fn new(store: LogStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }
}

impl Sink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn target(&self) -> String {
        self.store.root().display().to_string()
    }

    fn failure(&self) -> FailureMode {
        FailureMode::Hard
    }

    fn dispatch(&self, event: &ErrorEvent, ctx: &DispatchContext<'_>) -> Result<(), SinkError> {
        let path = self.store.save_at(event, ctx.snapshot, ctx.at)?;
        debug!(path = %path.display(), "error record appended");
        Ok(())
    }
}
