//! HTML rendering of notification and full-report mails.

use super::MailMessage;
use chrono::{DateTime, Local};
use faultline_common::event::ErrorEvent;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

const TH_STYLE: &str = "background-color: black;color: white; font-weight: bold";

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)fatal|error|warning|notice").expect("keyword pattern is valid"));

/// Renders [`MailMessage`]s for one dispatch.
pub struct MailFormatter<'a> {
    subject: &'a str,
    date: String,
}

impl<'a> MailFormatter<'a> {
    pub fn new(subject: &'a str, at: DateTime<Local>) -> Self {
        Self {
            subject,
            date: at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Lightweight notification: date and severity description only.
    pub fn notify(&self, to: &str, description: &str) -> MailMessage {
        let body = format!(
            "<b><u>DATE :</u></b><br />{}<br /><br /><br /><hr /><br /><br /><b><u>ERROR :</u></b><br />{}<br />",
            self.date,
            escape(description)
        );
        self.message(to, body)
    }

    /// Full report: detail table followed by one section per snapshot entry.
    pub fn full(&self, to: &str, event: &ErrorEvent, snapshot: &BTreeMap<String, String>) -> MailMessage {
        let mut body = format!(
            "<b><u>DATE :</u></b><br />{}<br /><br /><b><u>ERROR :</u></b><br />{}",
            self.date,
            detail_table(event)
        );
        for (index, (name, value)) in snapshot.iter().enumerate() {
            // Alternate grey shades per section.
            let shade = 0xf0 - (index % 5) as u8 * 5;
            let _ = write!(
                body,
                "<br /><hr /><br /><br /><b><u>{} :</u></b><br /><div style=\"background-color:#{shade:02x}{shade:02x}{shade:02x}\"><pre>{}</pre></div>",
                escape(name),
                escape(value)
            );
        }
        self.message(to, body)
    }

    fn message(&self, to: &str, html_body: String) -> MailMessage {
        MailMessage {
            to: to.to_string(),
            subject: self.subject.to_string(),
            headers: vec![
                ("MIME-Version".to_string(), "1.0".to_string()),
                ("Content-Type".to_string(), "text/html; charset=UTF-8".to_string()),
            ],
            html_body,
        }
    }
}

fn detail_table(event: &ErrorEvent) -> String {
    let context = serde_json::to_string_pretty(&event.context).unwrap_or_default();
    format!(
        "<table>\
<thead><th style='{TH_STYLE}'>ITEM</th><th style='{TH_STYLE}'>Description</th></thead>\
<tbody>\
<tr><th style='{TH_STYLE}'>Error</th><td><pre>{message}</pre></td></tr>\
<tr><th style='{TH_STYLE}'>Errno</th><td><pre>{severity}</pre></td></tr>\
<tr><th style='{TH_STYLE}'>File</th><td style='background-color:yellowgreen;font-weight:bold;color:black'>{file}</td></tr>\
<tr><th style='{TH_STYLE}'>Line</th><td>{line}</td></tr>\
<tr><th style='{TH_STYLE}'>Context</th><td style='background-color: #e8e8e8'><pre>{context}</pre></td></tr>\
<tr><th style='{TH_STYLE}'>Trace</th><td style='background-color: #d3d3d3'><pre>{backtrace}</pre></td></tr>\
</tbody></table>",
        message = colorize(&escape(&event.message)),
        severity = event.severity,
        file = escape(&event.location.file),
        line = event.location.line,
        context = colorize(&escape(&context)),
        backtrace = colorize(&escape(&event.backtrace)),
    )
}

/// Highlight severity keywords.
fn colorize(text: &str) -> String {
    KEYWORD_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let word = &caps[0];
            let color = match word.to_ascii_lowercase().as_str() {
                "warning" => "orange",
                "notice" => "yellow",
                _ => "red",
            };
            format!("<span style='color:{color};font-weight:bold'>{word}</span>")
        })
        .into_owned()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn notify_contains_only_description() {
        let formatter = MailFormatter::new("subj", at());
        let msg = formatter.notify("a@b.com", "WARNING (2): Run-time warning");

        assert_eq!(msg.to, "a@b.com");
        assert_eq!(msg.subject, "subj");
        assert!(msg.html_body.contains("2024-03-09 14:05:07"));
        assert!(msg.html_body.contains("WARNING (2): Run-time warning"));
        assert!(!msg.html_body.contains("<table>"));
        assert!(msg
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v.starts_with("text/html")));
    }

    #[test]
    fn full_report_has_table_and_snapshot() {
        let mut ctx = serde_json::Map::new();
        ctx.insert("order".into(), json!(17));
        let event = ErrorEvent::new(2, "disk <full>", "io.rs", 88)
            .with_context(ctx)
            .with_backtrace("0: main");
        let snapshot = BTreeMap::from([("PID".to_string(), "4242".to_string())]);

        let msg = MailFormatter::new("subj", at()).full("a@b.com", &event, &snapshot);

        assert!(msg.html_body.contains("<table>"));
        assert!(msg.html_body.contains("disk &lt;full&gt;"));
        assert!(msg.html_body.contains("io.rs"));
        assert!(msg.html_body.contains("<td>88</td>"));
        assert!(msg.html_body.contains("&quot;order&quot;: 17"));
        assert!(msg.html_body.contains("0: main"));
        assert!(msg.html_body.contains("<b><u>PID :</u></b>"));
        assert!(msg.html_body.contains("4242"));
    }

    #[test]
    fn keywords_are_highlighted_case_preserved() {
        let out = colorize("Fatal ERROR then a warning");
        assert!(out.contains("<span style='color:red;font-weight:bold'>Fatal</span>"));
        assert!(out.contains("<span style='color:red;font-weight:bold'>ERROR</span>"));
        assert!(out.contains("<span style='color:orange;font-weight:bold'>warning</span>"));
    }
}
