//! ProcessHost panic hook behavior.
//!
//! The panic hook is process-global, so everything touching it lives in a
//! single test.

use faultline::prelude::*;
use std::panic;

#[test]
fn panic_becomes_fatal_last_error_and_is_forwarded_once() {
    let mut engine = DispatchEngine::new(ProcessHost::new(), Box::new(NullTransport));
    engine.display_errors(false);

    // Non-fatal registration installs only the error hook.
    engine.register_throw(SeverityMask::WARNING);
    assert!(engine.host().is_error_hook_installed());
    assert!(!engine.host().is_shutdown_hook_installed());

    engine.register_throw(SeverityMask::FATAL);
    assert!(engine.host().is_shutdown_hook_installed());

    let line = line!() + 1;
    let result = panic::catch_unwind(|| panic!("worker exploded"));
    assert!(result.is_err());

    let last = engine.host().last_error().expect("panic recorded");
    assert_eq!(last.severity, SeverityKind::Error.code());
    assert_eq!(last.message, "worker exploded");
    assert!(last.file.ends_with("process_host_tests.rs"));
    assert_eq!(last.line, line);

    let forwarded = engine.shutdown();
    match forwarded {
        Err(DispatchError::Severity(err)) => {
            assert_eq!(err.kind, ErrorKind::FatalError);
            assert_eq!(err.message, "worker exploded");
        }
        other => panic!("expected fatal severity error, got {other:?}"),
    }
    assert!(!engine.shutdown().unwrap());

    engine.reset();
    assert!(!engine.host().is_shutdown_hook_installed());
    assert!(!engine.host().displays_errors());
    assert_eq!(engine.host().ambient_filter(), SeverityMask::all());
}
