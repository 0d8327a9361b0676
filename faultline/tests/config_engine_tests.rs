//! Building an engine from a TOML configuration file.

use faultline::prelude::*;
use faultline_common::config::NotifierConfig;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[derive(Default)]
struct QuietHost {
    filter: Option<SeverityMask>,
    display: bool,
    shutdown_hooks: usize,
}

impl Host for QuietHost {
    fn install_error_hook(&mut self) {}

    fn install_shutdown_hook(&mut self) {
        self.shutdown_hooks += 1;
    }

    fn ambient_filter(&self) -> SeverityMask {
        self.filter.unwrap_or(SeverityMask::all())
    }

    fn set_ambient_filter(&mut self, mask: SeverityMask) {
        self.filter = Some(mask);
    }

    fn last_error(&self) -> Option<LastError> {
        None
    }

    fn restore_default_hooks(&mut self) {
        self.filter = None;
    }

    fn set_display_errors(&mut self, display: bool) {
        self.display = display;
    }
}

fn load(toml: &str) -> NotifierConfig {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();
    file.flush().unwrap();
    NotifierConfig::load(file.path()).unwrap()
}

#[test]
fn engine_follows_configuration() {
    let logs = TempDir::new().unwrap();
    let config = load(&format!(
        r#"
[shared]
service_name = "billing-api"

[reporting]
filter = ["all"]
display_errors = true
mail_subject = "billing-api errors"

[[throw]]
severities = ["user_error"]

[[mail]]
to = ["ops@example.com", "not-an-address"]
severities = ["fatal"]

[[notify]]
to = ["oncall@example.com"]
severities = ["warning", 512]

[[log]]
path = "{}"
severities = ["notice"]
"#,
        logs.path().display()
    ));

    let engine = DispatchEngine::from_config(&config, QuietHost::default()).unwrap();

    assert_eq!(engine.state(), EngineState::Active);
    assert_eq!(engine.subject(), "billing-api errors");
    assert!(engine.host().display);
    assert_eq!(engine.host().shutdown_hooks, 1);

    let registry = engine.registry();
    assert!(registry.matching_throw(SeverityKind::UserError.code()));
    assert_eq!(registry.matching_mail_targets(SeverityKind::Error.code()), ["ops@example.com"]);
    assert_eq!(
        registry.matching_notify_targets(SeverityKind::UserWarning.code()),
        ["oncall@example.com"]
    );
    assert_eq!(registry.matching_log_paths(SeverityKind::Notice.code()), [logs.path()]);

    let notice = ErrorEvent::new(SeverityKind::Notice.code(), "m", "f.rs", 1);
    assert!(engine.handle(&notice).unwrap());
    assert_eq!(LogStore::new(logs.path()).list_days().unwrap().len(), 1);

    let user_error = ErrorEvent::new(SeverityKind::UserError.code(), "bad input", "f.rs", 2);
    assert!(matches!(engine.handle(&user_error), Err(DispatchError::Severity(_))));
}

#[test]
fn reporting_filter_suppresses() {
    let config = load(
        r#"
[shared]
service_name = "quiet"

[reporting]
filter = ["fatal"]

[[throw]]
"#,
    );

    let engine = DispatchEngine::from_config(&config, QuietHost::default()).unwrap();
    assert_eq!(engine.host().ambient_filter(), SeverityMask::FATAL);

    let warning = ErrorEvent::new(SeverityKind::Warning.code(), "w", "f.rs", 1);
    assert!(!engine.handle(&warning).unwrap());

    let error = ErrorEvent::new(SeverityKind::Error.code(), "e", "f.rs", 1);
    assert!(engine.handle(&error).is_err());
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = load(
        r#"
[shared]
service_name = "broken"

[[throw]]
severities = ["catastrophic"]
"#,
    );

    let result = DispatchEngine::from_config(&config, QuietHost::default());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}
