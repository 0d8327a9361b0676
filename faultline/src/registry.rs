//! Severity policy registry.
//!
//! Holds every registered policy for the lifetime of the engine: throw
//! masks, notify/mail/log policies in registration order, and at most one
//! custom handler per exact severity code. Policies are only ever added;
//! [`SeverityRegistry::clear`] drops them all at once on reset.

use crate::log_store::LogStore;
use crate::mail::is_valid_address;
use crate::sinks::{CustomHandler, CustomSink, LogSink, MailSink, NotifySink, Sink};
use faultline_common::severity::SeverityMask;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// One dispatch rule: a mask and the sink it feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy<S> {
    pub mask: SeverityMask,
    pub sink: S,
}

/// Registered policies, grouped by action.
#[derive(Debug, Default)]
pub struct SeverityRegistry {
    throws: Vec<SeverityMask>,
    notify: Vec<Policy<NotifySink>>,
    mail: Vec<Policy<MailSink>>,
    log: Vec<Policy<LogSink>>,
    custom: HashMap<u32, CustomSink>,
}

impl SeverityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_throw(&mut self, mask: SeverityMask) {
        self.throws.push(mask);
    }

    /// Register a full-report address. Malformed addresses are dropped.
    ///
    /// Returns whether the policy was accepted.
    pub fn register_mail(&mut self, address: &str, mask: SeverityMask) -> bool {
        if !is_valid_address(address) {
            debug!(address, "malformed mail address skipped");
            return false;
        }
        self.mail.push(Policy {
            mask,
            sink: MailSink::new(address),
        });
        true
    }

    /// Register a notify-only address. Malformed addresses are dropped.
    pub fn register_notify(&mut self, address: &str, mask: SeverityMask) -> bool {
        if !is_valid_address(address) {
            debug!(address, "malformed notify address skipped");
            return false;
        }
        self.notify.push(Policy {
            mask,
            sink: NotifySink::new(address),
        });
        true
    }

    pub fn register_log(&mut self, store: LogStore, mask: SeverityMask) {
        self.log.push(Policy {
            mask,
            sink: LogSink::new(store),
        });
    }

    /// Set the handler for one exact severity code, replacing any previous one.
    pub fn register_custom(&mut self, severity: u32, handler: CustomHandler) {
        self.custom.insert(severity, CustomSink::new(severity, handler));
    }

    /// Is `severity` covered by any throw mask.
    pub fn matching_throw(&self, severity: u32) -> bool {
        self.throws.iter().any(|mask| mask.matches(severity))
    }

    pub fn matching_mail_targets(&self, severity: u32) -> Vec<&str> {
        dedup(matching(&self.mail, severity).map(MailSink::address))
    }

    pub fn matching_notify_targets(&self, severity: u32) -> Vec<&str> {
        dedup(matching(&self.notify, severity).map(NotifySink::address))
    }

    pub fn matching_log_paths(&self, severity: u32) -> Vec<&Path> {
        dedup(matching(&self.log, severity).map(|sink| sink.store().root()))
    }

    pub fn custom_handler_for(&self, severity: u32) -> Option<&CustomSink> {
        self.custom.get(&severity)
    }

    /// Matching sinks in dispatch order: notify, then mail, then log.
    ///
    /// A destination registered more than once is returned once.
    pub fn matching_sinks(&self, severity: u32) -> Vec<&dyn Sink> {
        let notify = matching(&self.notify, severity).map(|s| s as &dyn Sink);
        let mail = matching(&self.mail, severity).map(|s| s as &dyn Sink);
        let log = matching(&self.log, severity).map(|s| s as &dyn Sink);

        let mut seen = HashSet::new();
        notify
            .chain(mail)
            .chain(log)
            .filter(|sink| seen.insert((sink.name(), sink.target())))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.throws.is_empty()
            && self.notify.is_empty()
            && self.mail.is_empty()
            && self.log.is_empty()
            && self.custom.is_empty()
    }

    /// Drop every policy, custom handlers included.
    pub fn clear(&mut self) {
        self.throws.clear();
        self.notify.clear();
        self.mail.clear();
        self.log.clear();
        self.custom.clear();
    }
}

fn matching<S>(policies: &[Policy<S>], severity: u32) -> impl Iterator<Item = &S> {
    policies
        .iter()
        .filter(move |policy| policy.mask.matches(severity))
        .map(|policy| &policy.sink)
}

fn dedup<T: Eq + std::hash::Hash + Copy>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}
