//! Prelude module for common re-exports.
//!
//! ```rust
//! use faultline_common::prelude::*;
//! ```

// ─── Severity ───────────────────────────────────────────────────────
pub use crate::severity::{SeverityKind, SeverityMask};

// ─── Classification ─────────────────────────────────────────────────
pub use crate::classifier::{ErrorKind, SeverityInfo, describe, error_kind, is_fatal};

// ─── Events ─────────────────────────────────────────────────────────
pub use crate::event::{Context, ErrorEvent, SourceLocation};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, DEFAULT_MAIL_SUBJECT, LogLevel, NotifierConfig, SharedConfig,
};
