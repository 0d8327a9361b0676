//! Configuration loading traits and types.
//!
//! A notifier is described by one TOML file: shared service settings, the
//! reporting filter, and the policy lists (throw, mail, notify, log).
//!
//! # Usage
//!
//! ```rust,no_run
//! use faultline_common::config::{ConfigLoader, ConfigError, NotifierConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = NotifierConfig::load(Path::new("faultline.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//! service_name = "billing-api"
//!
//! [reporting]
//! filter = ["all"]
//! mail_subject = "billing-api errors"
//!
//! [[throw]]
//! severities = ["fatal"]
//!
//! [[mail]]
//! to = ["ops@example.com"]
//! severities = ["fatal"]
//!
//! [[notify]]
//! to = ["oncall@example.com"]
//! severities = ["warning", "user_warning"]
//!
//! [[log]]
//! path = "/var/log/billing-api/errors"
//! severities = ["all"]
//! ```

use crate::severity::SeverityMask;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subject used for outgoing mail unless configured otherwise.
pub const DEFAULT_MAIL_SUBJECT: &str = "Faultline Reporting System";

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Common configuration fields.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "billing-api"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A severity as written in configuration: a name or a raw code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeveritySpec {
    Code(u32),
    Name(String),
}

impl SeveritySpec {
    /// Resolve into a mask. Raw codes keep unknown bits.
    pub fn resolve(&self) -> Result<SeverityMask, ConfigError> {
        match self {
            Self::Code(bits) => Ok(SeverityMask::from_raw(*bits)),
            Self::Name(name) => SeverityMask::from_config_name(name).ok_or_else(|| {
                ConfigError::ValidationError(format!("unknown severity name '{name}'"))
            }),
        }
    }
}

/// OR together a list of severity specs.
pub fn resolve_mask(specs: &[SeveritySpec]) -> Result<SeverityMask, ConfigError> {
    specs
        .iter()
        .try_fold(SeverityMask::empty(), |acc, spec| Ok(acc | spec.resolve()?))
}

fn default_severities() -> Vec<SeveritySpec> {
    vec![SeveritySpec::Name("all".to_string())]
}

fn default_subject() -> String {
    DEFAULT_MAIL_SUBJECT.to_string()
}

/// Reporting filter and mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportingConfig {
    /// Severities the host reports at all. Anything outside is suppressed.
    #[serde(default = "default_severities")]
    pub filter: Vec<SeveritySpec>,

    /// Whether the host still prints errors it reports.
    #[serde(default)]
    pub display_errors: bool,

    #[serde(default = "default_subject")]
    pub mail_subject: String,

    /// Path to a sendmail-compatible binary. Mail is dropped when unset.
    #[serde(default)]
    pub sendmail: Option<PathBuf>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            filter: default_severities(),
            display_errors: false,
            mail_subject: default_subject(),
            sendmail: None,
        }
    }
}

/// `[[throw]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrowPolicy {
    #[serde(default = "default_severities")]
    pub severities: Vec<SeveritySpec>,
}

/// `[[mail]]` and `[[notify]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MailPolicy {
    pub to: Vec<String>,
    #[serde(default = "default_severities")]
    pub severities: Vec<SeveritySpec>,
}

/// `[[log]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogPolicy {
    pub path: PathBuf,
    #[serde(default = "default_severities")]
    pub severities: Vec<SeveritySpec>,
}

/// Complete notifier configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub throw: Vec<ThrowPolicy>,
    #[serde(default)]
    pub mail: Vec<MailPolicy>,
    #[serde(default)]
    pub notify: Vec<MailPolicy>,
    #[serde(default)]
    pub log: Vec<LogPolicy>,
}

impl NotifierConfig {
    /// Validate shared settings, every severity name and every log path.
    ///
    /// Every policy must cover at least one severity; only the reporting
    /// filter may be empty. Malformed mail addresses are not a validation
    /// error: they are dropped when the policies are registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        resolve_mask(&self.reporting.filter)?;
        for policy in &self.throw {
            policy_mask("throw", &policy.severities)?;
        }
        for policy in &self.mail {
            policy_mask("mail", &policy.severities)?;
        }
        for policy in &self.notify {
            policy_mask("notify", &policy.severities)?;
        }
        for policy in &self.log {
            if policy.path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "log path cannot be empty".to_string(),
                ));
            }
            policy_mask("log", &policy.severities)?;
        }
        Ok(())
    }
}

fn policy_mask(section: &str, specs: &[SeveritySpec]) -> Result<SeverityMask, ConfigError> {
    let mask = resolve_mask(specs)?;
    if mask.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "[[{section}]] policy must cover at least one severity"
        )));
    }
    Ok(mask)
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
