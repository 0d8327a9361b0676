//! Faultline Common Library
//!
//! Shared vocabulary for every Faultline crate: severity kinds and masks,
//! the classification table, the error event and configuration loading.
//!
//! # Module Structure
//!
//! - [`severity`] - Severity kinds and the `SeverityMask` bitflags
//! - [`classifier`] - Static classification table (`describe`, `is_fatal`, `error_kind`)
//! - [`event`] - `ErrorEvent` and its source location
//! - [`config`] - TOML configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use faultline_common::prelude::*;
//!
//! let event = ErrorEvent::new(SeverityKind::UserWarning.code(), "disk almost full", "main.rs", 12);
//! assert!(!event.is_fatal());
//! assert!(SeverityMask::all().matches(event.severity));
//! ```

pub mod classifier;
pub mod config;
pub mod event;
pub mod prelude;
pub mod severity;
