//! Host runtime hook surface.
//!
//! The dispatch engine never talks to the runtime directly. It asks a
//! [`Host`] to install its error and shutdown hooks, reads the ambient
//! reporting filter from it, and on shutdown asks it for the last error
//! the runtime saw. [`ProcessHost`] is the implementation for a plain
//! Rust process, where a panic is the fatal last error.
//!
//! Reported errors are delivered by calling
//! [`DispatchEngine::handle`](crate::DispatchEngine::handle) or
//! [`DispatchEngine::trigger`](crate::DispatchEngine::trigger); the engine
//! owns the dispatch path, so the error hook carries no callback. A host
//! whose runtime pushes errors wires that channel to `handle` itself.

use faultline_common::severity::{SeverityKind, SeverityMask};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::panic::PanicHookInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Last error recorded by the host runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub severity: u32,
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// Hook surface a host runtime exposes to the dispatch engine.
///
/// Implementations must tolerate repeated calls; the engine guards its own
/// installs but `restore_default_hooks` may run without prior installs.
pub trait Host {
    /// Mark the runtime's error channel as routed to the engine.
    ///
    /// Called once before the first policy is registered. Errors still
    /// arrive through `handle`; implementations only switch the runtime's
    /// own reporting over.
    fn install_error_hook(&mut self);

    /// Arrange for the last fatal error to be retrievable at shutdown.
    fn install_shutdown_hook(&mut self);

    /// Severities the runtime currently reports. Others are suppressed.
    fn ambient_filter(&self) -> SeverityMask;

    fn set_ambient_filter(&mut self, mask: SeverityMask);

    /// Last error seen by the runtime, if any.
    fn last_error(&self) -> Option<LastError>;

    /// Undo every installed hook and restore the runtime defaults.
    fn restore_default_hooks(&mut self);

    /// Whether the runtime keeps printing errors it reports.
    fn set_display_errors(&mut self, _display: bool) {}

    /// Opaque request/environment state attached to full reports.
    fn ambient_snapshot(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// [`Host`] for the current Rust process.
///
/// The shutdown hook is a panic hook chained in front of the previous one:
/// a panic is recorded as a fatal [`SeverityKind::Error`] last error with
/// the panic location. The previous hook only runs while errors are
/// displayed.
pub struct ProcessHost {
    filter: SeverityMask,
    display: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<LastError>>>,
    error_hook: bool,
    shutdown_hook: bool,
}

impl ProcessHost {
    pub fn new() -> Self {
        Self {
            filter: SeverityMask::all(),
            display: Arc::new(AtomicBool::new(true)),
            last_error: Arc::new(Mutex::new(None)),
            error_hook: false,
            shutdown_hook: false,
        }
    }

    /// Record an error the runtime observed outside the panic path.
    pub fn record_error(&self, error: LastError) {
        *self.last_error.lock() = Some(error);
    }

    pub fn is_error_hook_installed(&self) -> bool {
        self.error_hook
    }

    pub fn is_shutdown_hook_installed(&self) -> bool {
        self.shutdown_hook
    }

    pub fn displays_errors(&self) -> bool {
        self.display.load(Ordering::Relaxed)
    }
}

impl Default for ProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for ProcessHost {
    /// A Rust process has no runtime error channel to redirect: callers
    /// report through the engine directly. Only panics need a hook.
    fn install_error_hook(&mut self) {
        self.error_hook = true;
        debug!("process error hook installed");
    }

    fn install_shutdown_hook(&mut self) {
        let previous = std::panic::take_hook();
        let last_error = Arc::clone(&self.last_error);
        let display = Arc::clone(&self.display);

        std::panic::set_hook(Box::new(move |info| {
            let (file, line) = info
                .location()
                .map(|loc| (loc.file().to_string(), loc.line()))
                .unwrap_or_default();
            *last_error.lock() = Some(LastError {
                severity: SeverityKind::Error.code(),
                message: panic_message(info),
                file,
                line,
            });
            if display.load(Ordering::Relaxed) {
                previous(info);
            }
        }));

        self.shutdown_hook = true;
        debug!("process panic hook installed");
    }

    fn ambient_filter(&self) -> SeverityMask {
        self.filter
    }

    fn set_ambient_filter(&mut self, mask: SeverityMask) {
        self.filter = mask;
    }

    fn last_error(&self) -> Option<LastError> {
        self.last_error.lock().clone()
    }

    fn restore_default_hooks(&mut self) {
        if self.shutdown_hook {
            // Dropping our hook reinstates the default one.
            drop(std::panic::take_hook());
        }
        self.error_hook = false;
        self.shutdown_hook = false;
        self.filter = SeverityMask::all();
        self.display.store(false, Ordering::Relaxed);
        debug!("process hooks restored to defaults");
    }

    fn set_display_errors(&mut self, display: bool) {
        self.display.store(display, Ordering::Relaxed);
    }

    fn ambient_snapshot(&self) -> BTreeMap<String, String> {
        let mut snapshot = BTreeMap::new();
        snapshot.insert("PID".to_string(), std::process::id().to_string());
        if let Ok(hostname) = nix::unistd::gethostname() {
            snapshot.insert("HOSTNAME".to_string(), hostname.to_string_lossy().into_owned());
        }
        if let Ok(cwd) = std::env::current_dir() {
            snapshot.insert("CWD".to_string(), cwd.display().to_string());
        }
        if let Some(name) = std::thread::current().name() {
            snapshot.insert("THREAD".to_string(), name.to_string());
        }
        snapshot.insert("ARGV".to_string(), std::env::args().collect::<Vec<_>>().join(" "));

        let mut env: Vec<(String, String)> = std::env::vars().collect();
        env.sort();
        let env = env
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");
        snapshot.insert("ENV".to_string(), env);
        snapshot
    }
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
