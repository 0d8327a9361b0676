//! Severity-based dispatch engine.
//!
//! The engine owns the host, the mail transport and the policy registry.
//! For each event it runs, in order:
//!
//! ```text
//! ambient filter ──▶ notify ──▶ mail ──▶ log ──▶ custom handler | throw
//!   (suppress)       (soft)     (soft)   (hard)
//! ```
//!
//! Registration is the only thing that moves the engine from
//! [`EngineState::Uninitialized`] to [`EngineState::Active`]; it installs
//! the host error hook once, and the shutdown hook once the first mask
//! touching a fatal severity is registered.

use crate::bridge::FatalBridge;
use crate::error::{DispatchResult, SeverityError};
use crate::host::Host;
use crate::log_store::LogStore;
use crate::mail::{MailTransport, NullTransport, SendmailTransport};
use crate::registry::SeverityRegistry;
use crate::sinks::{CustomHandler, DispatchContext, FailureMode, Sink};
use chrono::Local;
use faultline_common::config::{ConfigError, DEFAULT_MAIL_SUBJECT, NotifierConfig, resolve_mask};
use faultline_common::event::ErrorEvent;
use faultline_common::severity::{SeverityKind, SeverityMask};
use std::backtrace::Backtrace;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`DispatchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No policy registered, no hook installed.
    #[default]
    Uninitialized,
    /// At least one policy registered; the error hook is installed.
    Active,
}

/// Decides, per event, which sinks run and whether the event is re-raised.
pub struct DispatchEngine<H: Host> {
    host: H,
    transport: Box<dyn MailTransport>,
    registry: SeverityRegistry,
    subject: String,
    state: EngineState,
    error_hook_installed: bool,
    shutdown_hook_installed: bool,
    bridge: FatalBridge,
}

impl<H: Host> DispatchEngine<H> {
    pub fn new(host: H, transport: Box<dyn MailTransport>) -> Self {
        Self {
            host,
            transport,
            registry: SeverityRegistry::new(),
            subject: DEFAULT_MAIL_SUBJECT.to_string(),
            state: EngineState::Uninitialized,
            error_hook_installed: false,
            shutdown_hook_installed: false,
            bridge: FatalBridge::new(),
        }
    }

    /// Engine whose host reports only the severities in `filter`.
    pub fn with_reporting(host: H, transport: Box<dyn MailTransport>, filter: SeverityMask) -> Self {
        let mut engine = Self::new(host, transport);
        engine.host.set_ambient_filter(filter);
        engine
    }

    /// Build an engine from a validated configuration file.
    ///
    /// Mail goes through `reporting.sendmail` when set and is dropped
    /// otherwise.
    pub fn from_config(config: &NotifierConfig, host: H) -> Result<Self, ConfigError> {
        let transport: Box<dyn MailTransport> = match &config.reporting.sendmail {
            Some(program) => Box::new(SendmailTransport::new(program)),
            None => Box::new(NullTransport),
        };
        Self::from_config_with(config, host, transport)
    }

    /// Like [`from_config`](Self::from_config) with an explicit transport.
    pub fn from_config_with(
        config: &NotifierConfig,
        host: H,
        transport: Box<dyn MailTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let filter = resolve_mask(&config.reporting.filter)?;
        let mut engine = Self::with_reporting(host, transport, filter);
        engine.display_errors(config.reporting.display_errors);
        engine.set_mail_subject(config.reporting.mail_subject.clone());

        for policy in &config.throw {
            engine.register_throw(resolve_mask(&policy.severities)?);
        }
        for policy in &config.notify {
            engine.register_notify(&policy.to, resolve_mask(&policy.severities)?);
        }
        for policy in &config.mail {
            engine.register_mail(&policy.to, resolve_mask(&policy.severities)?);
        }
        for policy in &config.log {
            engine.register_log(policy.path.clone(), resolve_mask(&policy.severities)?);
        }

        info!(
            service = %config.shared.service_name,
            throw = config.throw.len(),
            notify = config.notify.len(),
            mail = config.mail.len(),
            log = config.log.len(),
            "dispatch engine configured"
        );
        Ok(engine)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &SeverityRegistry {
        &self.registry
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn is_error_hook_installed(&self) -> bool {
        self.error_hook_installed
    }

    pub fn is_shutdown_hook_installed(&self) -> bool {
        self.shutdown_hook_installed
    }

    /// Subject line for every outgoing mail.
    pub fn set_mail_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = subject.into();
        self
    }

    /// Whether the host keeps printing the errors it reports.
    pub fn display_errors(&mut self, display: bool) -> &mut Self {
        self.host.set_display_errors(display);
        self
    }

    // ─── Registration ───────────────────────────────────────────────

    /// Re-raise matching severities as [`SeverityError`].
    pub fn register_throw(&mut self, mask: SeverityMask) -> &mut Self {
        self.ensure_installed(mask);
        self.registry.register_throw(mask);
        self
    }

    /// Send full reports to each address. Malformed addresses are skipped.
    pub fn register_mail<I, S>(&mut self, addresses: I, mask: SeverityMask) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_installed(mask);
        for address in addresses {
            self.registry.register_mail(address.as_ref(), mask);
        }
        self
    }

    /// Send description-only notifications to each address.
    pub fn register_notify<I, S>(&mut self, addresses: I, mask: SeverityMask) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_installed(mask);
        for address in addresses {
            self.registry.register_notify(address.as_ref(), mask);
        }
        self
    }

    /// Append matching events to the day-rotated log under `root`.
    ///
    /// Directories are created on the first write.
    pub fn register_log(&mut self, root: impl Into<PathBuf>, mask: SeverityMask) -> &mut Self {
        self.ensure_installed(mask);
        self.registry.register_log(LogStore::new(root), mask);
        self
    }

    /// Hand events of exactly `severity` to `handler` instead of throwing.
    pub fn register_custom<F>(&mut self, severity: u32, handler: F) -> &mut Self
    where
        F: Fn(&ErrorEvent) -> Result<(), crate::error::HandlerError> + 'static,
    {
        self.ensure_installed(SeverityMask::from_raw(severity));
        let handler: CustomHandler = Box::new(handler);
        self.registry.register_custom(severity, handler);
        self
    }

    fn ensure_installed(&mut self, mask: SeverityMask) {
        if !self.error_hook_installed {
            self.host.install_error_hook();
            self.error_hook_installed = true;
            info!("error hook installed");
        }
        if mask.has_fatal() && !self.shutdown_hook_installed {
            self.host.install_shutdown_hook();
            self.shutdown_hook_installed = true;
            info!("shutdown hook installed");
        }
        self.state = EngineState::Active;
    }

    // ─── Dispatch ───────────────────────────────────────────────────

    /// Dispatch one event.
    ///
    /// Returns `Ok(false)` when the host's ambient filter suppresses the
    /// severity and `Ok(true)` when the event was handled. Mail failures are
    /// logged and skipped; a log failure, a failing custom handler or a
    /// matching throw policy ends dispatch with an error.
    pub fn handle(&self, event: &ErrorEvent) -> DispatchResult<bool> {
        let severity = event.severity;
        if !self.host.ambient_filter().matches(severity) {
            debug!(severity, "suppressed by ambient filter");
            return Ok(false);
        }

        let sinks = self.registry.matching_sinks(severity);
        debug!(severity, sinks = sinks.len(), "dispatching {}", event.describe());

        let snapshot = if sinks.is_empty() {
            Default::default()
        } else {
            self.host.ambient_snapshot()
        };
        let ctx = DispatchContext {
            transport: self.transport.as_ref(),
            subject: &self.subject,
            snapshot: &snapshot,
            at: Local::now(),
        };

        for sink in sinks {
            let Err(err) = sink.dispatch(event, &ctx) else {
                continue;
            };
            match sink.failure() {
                FailureMode::Soft => {
                    warn!(sink = sink.name(), destination = %sink.target(), "{err}");
                }
                FailureMode::Hard => {
                    error!(sink = sink.name(), destination = %sink.target(), "{err}");
                    return Err(err.into());
                }
            }
        }

        if let Some(custom) = self.registry.custom_handler_for(severity) {
            custom.dispatch(event, &ctx)?;
            return Ok(true);
        }

        if self.registry.matching_throw(severity) {
            return Err(SeverityError::from_event(event).into());
        }
        Ok(true)
    }

    /// Raise a user error from the caller's location, with a backtrace.
    #[track_caller]
    pub fn trigger(&self, kind: SeverityKind, message: impl Into<String>) -> DispatchResult<bool> {
        let caller = std::panic::Location::caller();
        let event = ErrorEvent::new(kind.code(), message, caller.file(), caller.line())
            .with_backtrace(Backtrace::force_capture().to_string());
        self.handle(&event)
    }

    /// Trigger the selected user-level test errors, in notice, warning,
    /// error order. Stops at the first error dispatch returns.
    pub fn self_test(&self, notice: bool, warning: bool, error: bool) -> DispatchResult<()> {
        if notice {
            self.trigger(SeverityKind::UserNotice, "Faultline self-test notice")?;
        }
        if warning {
            self.trigger(SeverityKind::UserWarning, "Faultline self-test warning")?;
        }
        if error {
            self.trigger(SeverityKind::UserError, "Faultline self-test error")?;
        }
        Ok(())
    }

    /// Forward the host's fatal last error, once.
    ///
    /// `Ok(false)` when there is nothing to forward, including when no
    /// registered mask covers a fatal severity; otherwise the result of
    /// dispatching it.
    pub fn shutdown(&mut self) -> DispatchResult<bool> {
        if !self.shutdown_hook_installed {
            debug!("no shutdown hook installed, nothing to forward");
            return Ok(false);
        }
        let Some(event) = self.bridge.take_event(&self.host) else {
            return Ok(false);
        };
        info!(severity = event.severity, "forwarding fatal last error");
        self.handle(&event)
    }

    /// Restore host defaults and drop every policy and install flag.
    pub fn reset(&mut self) {
        self.host.restore_default_hooks();
        self.registry.clear();
        self.error_hook_installed = false;
        self.shutdown_hook_installed = false;
        self.bridge.reset();
        self.subject = DEFAULT_MAIL_SUBJECT.to_string();
        self.state = EngineState::Uninitialized;
        info!("dispatch engine reset");
    }
}
