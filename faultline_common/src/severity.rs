//! Severity kinds and the bitmask policies are expressed in.
//!
//! A severity code is the raw `u32` a host reports. The 15 known kinds each
//! occupy one bit; a [`SeverityMask`] is any combination of them. Masks are
//! never validated: bits outside the known kinds are kept and still take
//! part in matching, they just classify as "Unknown".

use bitflags::bitflags;

bitflags! {
    /// Set of severity kinds a policy reacts to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SeverityMask: u32 {
        /// Fatal run-time error.
        const ERROR             = 0x0001;
        /// Run-time warning (non-fatal).
        const WARNING           = 0x0002;
        /// Parse error.
        const PARSE             = 0x0004;
        /// Run-time notice.
        const NOTICE            = 0x0008;
        /// Fatal error during startup.
        const CORE_ERROR        = 0x0010;
        /// Warning during startup.
        const CORE_WARNING      = 0x0020;
        /// Fatal compile-time error.
        const COMPILE_ERROR     = 0x0040;
        /// Compile-time warning.
        const COMPILE_WARNING   = 0x0080;
        /// User-triggered error.
        const USER_ERROR        = 0x0100;
        /// User-triggered warning.
        const USER_WARNING      = 0x0200;
        /// User-triggered notice.
        const USER_NOTICE       = 0x0400;
        /// Strict-mode suggestion.
        const STRICT            = 0x0800;
        /// Catchable fatal error.
        const RECOVERABLE_ERROR = 0x1000;
        /// Deprecation notice.
        const DEPRECATED        = 0x2000;
        /// User-triggered deprecation notice.
        const USER_DEPRECATED   = 0x4000;
    }
}

impl SeverityMask {
    /// Kinds that terminate the host process when left unhandled.
    pub const FATAL: Self = Self::from_bits_truncate(
        Self::ERROR.bits()
            | Self::USER_ERROR.bits()
            | Self::PARSE.bits()
            | Self::CORE_ERROR.bits()
            | Self::COMPILE_ERROR.bits()
            | Self::RECOVERABLE_ERROR.bits(),
    );

    /// Build a mask from a raw integer, keeping unknown bits.
    #[inline]
    pub const fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Returns true if any bit of `code` is covered by this mask.
    #[inline]
    pub const fn matches(&self, code: u32) -> bool {
        self.bits() & code != 0
    }

    /// Returns true if any fatal kind is part of this mask.
    #[inline]
    pub const fn has_fatal(&self) -> bool {
        self.intersects(Self::FATAL)
    }

    /// Resolve a configuration name into a mask.
    ///
    /// Accepts `"all"`, `"fatal"`, `"none"` and every [`SeverityKind::name`].
    /// Matching is case-insensitive.
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Some(Self::all()),
            "fatal" => Some(Self::FATAL),
            "none" => Some(Self::empty()),
            other => SeverityKind::from_name(other).map(SeverityKind::mask),
        }
    }
}

impl Default for SeverityMask {
    /// Every known kind: the default mask of each registration.
    fn default() -> Self {
        Self::all()
    }
}

/// One of the 15 known severity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityKind {
    Error,
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
}

impl SeverityKind {
    /// All kinds in ascending code order.
    pub const ALL: [SeverityKind; 15] = [
        Self::Error,
        Self::Warning,
        Self::Parse,
        Self::Notice,
        Self::CoreError,
        Self::CoreWarning,
        Self::CompileError,
        Self::CompileWarning,
        Self::UserError,
        Self::UserWarning,
        Self::UserNotice,
        Self::Strict,
        Self::RecoverableError,
        Self::Deprecated,
        Self::UserDeprecated,
    ];

    /// Single-bit mask of this kind.
    pub const fn mask(self) -> SeverityMask {
        match self {
            Self::Error => SeverityMask::ERROR,
            Self::Warning => SeverityMask::WARNING,
            Self::Parse => SeverityMask::PARSE,
            Self::Notice => SeverityMask::NOTICE,
            Self::CoreError => SeverityMask::CORE_ERROR,
            Self::CoreWarning => SeverityMask::CORE_WARNING,
            Self::CompileError => SeverityMask::COMPILE_ERROR,
            Self::CompileWarning => SeverityMask::COMPILE_WARNING,
            Self::UserError => SeverityMask::USER_ERROR,
            Self::UserWarning => SeverityMask::USER_WARNING,
            Self::UserNotice => SeverityMask::USER_NOTICE,
            Self::Strict => SeverityMask::STRICT,
            Self::RecoverableError => SeverityMask::RECOVERABLE_ERROR,
            Self::Deprecated => SeverityMask::DEPRECATED,
            Self::UserDeprecated => SeverityMask::USER_DEPRECATED,
        }
    }

    /// Raw severity code.
    #[inline]
    pub const fn code(self) -> u32 {
        self.mask().bits()
    }

    /// Exact lookup: `None` for combined or unknown codes.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Lowercase name used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Parse => "parse",
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
        }
    }

    /// Inverse of [`SeverityKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns true if this kind is part of [`SeverityMask::FATAL`].
    #[inline]
    pub const fn is_fatal(self) -> bool {
        SeverityMask::FATAL.contains(self.mask())
    }
}
