//! Outbound mail: message type, transports and address validation.
//!
//! The engine only needs `send(message)`. [`SendmailTransport`] pipes the
//! message into a sendmail-compatible program; [`NullTransport`] drops it.

pub mod format;

pub use format::MailFormatter;

use crate::error::MailError;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tracing::debug;

/// Syntactic address check: local part, `@`, dotted domain labels.
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("address pattern is valid")
});

/// Returns true if `address` is a syntactically well-formed mail address.
pub fn is_valid_address(address: &str) -> bool {
    address.len() <= 254
        && !address.starts_with('.')
        && !address.contains("..")
        && !address.contains(".@")
        && ADDRESS_RE.is_match(address)
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub headers: Vec<(String, String)>,
    pub html_body: String,
}

/// Capability to deliver one message.
pub trait MailTransport {
    fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Pipes messages into a sendmail-compatible program.
///
/// Blocks until the program exits. A non-zero exit is an error.
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    program: PathBuf,
    args: Vec<String>,
}

impl SendmailTransport {
    /// Default location of the system sendmail.
    pub const DEFAULT_PROGRAM: &'static str = "/usr/sbin/sendmail";

    /// Transport invoking `program -t -i`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-t".to_string(), "-i".to_string()],
        }
    }

    /// Replace the program arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for SendmailTransport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl MailTransport for SendmailTransport {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| MailError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The child is reaped even when writing fails; stdin is closed first.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&render(message)),
            None => Ok(()),
        };
        let status = child.wait()?;
        written?;
        if !status.success() {
            return Err(MailError::Status { status });
        }
        debug!(to = %message.to, "mail handed to {}", self.program.display());
        Ok(())
    }
}

/// Drops every message. Used when no transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl MailTransport for NullTransport {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        debug!(to = %message.to, subject = %message.subject, "no mail transport, message dropped");
        Ok(())
    }
}

/// Header block, blank line and body, as sendmail reads them on stdin.
fn render(message: &MailMessage) -> Vec<u8> {
    let mut raw = format!(
        "To: {}\r\nSubject: {}\r\n",
        header_value(&message.to),
        header_value(&message.subject)
    );
    for (name, value) in &message.headers {
        raw.push_str(&format!("{}: {}\r\n", header_value(name), header_value(value)));
    }
    raw.push_str("\r\n");
    raw.push_str(&message.html_body);
    raw.into_bytes()
}

// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn message() -> MailMessage {
        MailMessage {
            to: "ops@example.com".into(),
            subject: "Subject\r\nBcc: evil@example.com".into(),
            headers: vec![("MIME-Version".into(), "1.0".into())],
            html_body: "<b>body</b>".into(),
        }
    }

    #[test]
    fn address_validation() {
        for ok in ["a@b.com", "first.last+tag@sub.example.org", "x_y@domain-1.io"] {
            assert!(is_valid_address(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "plain",
            "a@b",
            "@b.com",
            "a@.com",
            "a@b..com",
            "a..b@c.com",
            ".a@c.com",
            "a.@c.com",
            "a b@c.com",
            "a@-b.com",
        ] {
            assert!(!is_valid_address(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn sendmail_writes_headers_and_body() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("mail.txt");
        let transport = SendmailTransport::new("/bin/sh")
            .with_args(["-c".to_string(), format!("cat > '{}'", out.display())]);

        transport.send(&message()).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("To: ops@example.com\r\n"));
        // Injected line breaks are flattened.
        assert!(written.contains("Subject: Subject  Bcc: evil@example.com\r\n"));
        assert!(written.contains("MIME-Version: 1.0\r\n"));
        assert!(written.ends_with("\r\n<b>body</b>"));
    }

    #[test]
    fn sendmail_nonzero_exit_is_error() {
        let transport =
            SendmailTransport::new("/bin/sh").with_args(["-c", "cat > /dev/null; exit 3"]);
        assert!(matches!(
            transport.send(&message()),
            Err(MailError::Status { .. })
        ));
    }

    #[test]
    fn sendmail_exiting_without_reading_is_reaped() {
        let tmp = TempDir::new().unwrap();
        let pid_file = tmp.path().join("pid");
        let transport = SendmailTransport::new("/bin/sh")
            .with_args(["-c".to_string(), format!("echo $$ > '{}'; exit 0", pid_file.display())]);

        let mut large = message();
        large.html_body = "x".repeat(4 * 1024 * 1024);

        assert!(matches!(transport.send(&large), Err(MailError::Io { .. })));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let proc_entry = std::path::Path::new("/proc").join(pid.trim());
        assert!(!proc_entry.exists(), "sendmail child {} left unreaped", pid.trim());
    }

    #[test]
    fn sendmail_missing_program_is_spawn_error() {
        let transport = SendmailTransport::new("/nonexistent/sendmail");
        assert!(matches!(
            transport.send(&message()),
            Err(MailError::Spawn { .. })
        ));
    }

    #[test]
    fn null_transport_accepts_everything() {
        assert!(NullTransport.send(&message()).is_ok());
    }
}
