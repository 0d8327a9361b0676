//! Severity classification table.
//!
//! One static row per known kind drives every classification question:
//! the human-readable description, fatal membership and the error kind a
//! throw policy raises. Nothing here allocates except [`describe`].

use crate::severity::{SeverityKind, SeverityMask};
use static_assertions::const_assert_eq;
use std::fmt;

/// Named error kind raised by a throw policy.
///
/// Each known severity kind maps to exactly one variant; every other code
/// maps to [`ErrorKind::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FatalError,
    Warning,
    Parse,
    Notice,
    CoreError,
    CoreWarning,
    CompileError,
    CompileWarning,
    UserError,
    UserWarning,
    UserNotice,
    Strict,
    RecoverableError,
    Deprecated,
    UserDeprecated,
    /// Fallback for codes outside the known kinds.
    Generic,
}

impl ErrorKind {
    /// Stable identifier, suitable for logs and matching.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FatalError => "fatal_error",
            Self::Warning => "warning",
            Self::Parse => "parse_error",
            Self::Notice => "notice",
            Self::CoreError => "core_error",
            Self::CoreWarning => "core_warning",
            Self::CompileError => "compile_error",
            Self::CompileWarning => "compile_warning",
            Self::UserError => "user_error",
            Self::UserWarning => "user_warning",
            Self::UserNotice => "user_notice",
            Self::Strict => "strict",
            Self::RecoverableError => "recoverable_error",
            Self::Deprecated => "deprecated",
            Self::UserDeprecated => "user_deprecated",
            Self::Generic => "error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityInfo {
    pub kind: SeverityKind,
    pub label: &'static str,
    pub description: &'static str,
    pub fatal: bool,
    pub error_kind: ErrorKind,
}

const fn row(
    kind: SeverityKind,
    label: &'static str,
    description: &'static str,
    error_kind: ErrorKind,
) -> SeverityInfo {
    SeverityInfo {
        kind,
        label,
        description,
        fatal: SeverityMask::FATAL.contains(kind.mask()),
        error_kind,
    }
}

/// Classification table, ordered by ascending severity code.
pub static SEVERITY_TABLE: [SeverityInfo; 15] = [
    row(SeverityKind::Error, "ERROR", "Fatal run-time error", ErrorKind::FatalError),
    row(SeverityKind::Warning, "WARNING", "Run-time warning (non-fatal error)", ErrorKind::Warning),
    row(SeverityKind::Parse, "PARSE", "Compile-time parse error", ErrorKind::Parse),
    row(SeverityKind::Notice, "NOTICE", "Run-time notice", ErrorKind::Notice),
    row(SeverityKind::CoreError, "CORE_ERROR", "Fatal error during initial startup", ErrorKind::CoreError),
    row(SeverityKind::CoreWarning, "CORE_WARNING", "Warning (non-fatal error) during initial startup", ErrorKind::CoreWarning),
    row(SeverityKind::CompileError, "COMPILE_ERROR", "Fatal compile-time error", ErrorKind::CompileError),
    row(SeverityKind::CompileWarning, "COMPILE_WARNING", "Compile-time warning (non-fatal error)", ErrorKind::CompileWarning),
    row(SeverityKind::UserError, "USER_ERROR", "User-generated error message", ErrorKind::UserError),
    row(SeverityKind::UserWarning, "USER_WARNING", "User-generated warning message", ErrorKind::UserWarning),
    row(SeverityKind::UserNotice, "USER_NOTICE", "User-generated notice message", ErrorKind::UserNotice),
    row(SeverityKind::Strict, "STRICT", "Suggested change to the code", ErrorKind::Strict),
    row(SeverityKind::RecoverableError, "RECOVERABLE_ERROR", "Catchable fatal error", ErrorKind::RecoverableError),
    row(SeverityKind::Deprecated, "DEPRECATED", "Run-time deprecation notice", ErrorKind::Deprecated),
    row(SeverityKind::UserDeprecated, "USER_DEPRECATED", "User-generated deprecation notice", ErrorKind::UserDeprecated),
];

// Every known kind has a row and the kinds fill the low 15 bits.
const_assert_eq!(SeverityMask::all().bits(), 0x7FFF);

/// Table row for an exact severity code.
pub fn lookup(code: u32) -> Option<&'static SeverityInfo> {
    SEVERITY_TABLE.iter().find(|info| info.kind.code() == code)
}

/// Human-readable label and one-line description for a severity code.
pub fn describe(code: u32) -> String {
    match lookup(code) {
        Some(info) => format!("{} ({code}): {}", info.label, info.description),
        None => format!("Undefined ({code}): Unknown error"),
    }
}

/// Returns true iff `code` is exactly one of the fatal kinds.
#[inline]
pub fn is_fatal(code: u32) -> bool {
    lookup(code).is_some_and(|info| info.fatal)
}

/// Error kind raised for `code` on the throw path. Total.
#[inline]
pub fn error_kind(code: u32) -> ErrorKind {
    lookup(code).map_or(ErrorKind::Generic, |info| info.error_kind)
}
