//! # Faultline
//!
//! Severity-based error interception: errors reported by a host runtime are
//! classified by severity and dispatched to notify mail, full-report mail,
//! day-rotated log files and custom handlers, or re-raised as typed errors.
//!
//! # Module Structure
//!
//! - [`engine`] - `DispatchEngine`, the per-event dispatch order
//! - [`registry`] - Registered policies and matching queries
//! - [`sinks`] - `Sink` trait with notify, mail, log and custom sinks
//! - [`mail`] - Mail rendering, address validation and transports
//! - [`log_store`] - On-disk log layout, append and read-back
//! - [`host`] - `Host` hook surface and the `ProcessHost` implementation
//! - [`bridge`] - Forwarding of the host's fatal last error at shutdown
//! - [`error`] - Error types
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                               faultline                                │
//! │                                                                        │
//! │  ┌─────────────┐    ┌──────────────────┐    ┌──────────────────┐       │
//! │  │    Host     │───►│  DispatchEngine  │◄──►│ SeverityRegistry │       │
//! │  │ hooks, last │    │  filter, order,  │    │    (policies)    │       │
//! │  │    error    │    │  throw decision  │    └──────────────────┘       │
//! │  └──────┬──────┘    └────────┬─────────┘                               │
//! │         │ shutdown           │                                         │
//! │  ┌──────▼──────┐    ┌────────▼─────────┐                               │
//! │  │ FatalBridge │    │   Sink (trait)   │ notify, mail, log, custom     │
//! │  └─────────────┘    └──────────────────┘                               │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use faultline::prelude::*;
//!
//! let mut engine = DispatchEngine::new(ProcessHost::new(), Box::new(NullTransport));
//! engine.register_throw(SeverityMask::USER_ERROR);
//!
//! let warning = ErrorEvent::new(SeverityKind::UserWarning.code(), "low disk", "main.rs", 3);
//! assert!(engine.handle(&warning).unwrap());
//!
//! let error = ErrorEvent::new(SeverityKind::UserError.code(), "disk full", "main.rs", 4);
//! assert!(engine.handle(&error).is_err());
//! # engine.reset();
//! ```

pub mod bridge;
pub mod engine;
pub mod error;
pub mod host;
pub mod log_store;
pub mod mail;
pub mod registry;
pub mod sinks;

// Re-export key types for convenience
pub use crate::engine::{DispatchEngine, EngineState};
pub use crate::error::{DispatchError, DispatchResult, SeverityError};
pub use crate::host::{Host, LastError, ProcessHost};

/// Common imports for embedding the engine.
pub mod prelude {
    pub use crate::engine::{DispatchEngine, EngineState};
    pub use crate::error::{DispatchError, DispatchResult, SeverityError};
    pub use crate::host::{Host, LastError, ProcessHost};
    pub use crate::log_store::{LogRecord, LogStore};
    pub use crate::mail::{MailTransport, NullTransport, SendmailTransport};
    pub use faultline_common::prelude::*;
}
