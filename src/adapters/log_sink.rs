//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every application event to the
//! `log` facade (UART / USB-CDC on target, stderr on host), prefixed
//! with its numeric event id.  Severity selects the log level.

use log::{Level, log};

use crate::app::events::{AppEvent, Severity};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn level(severity: Severity) -> Level {
    match severity {
        Severity::Information => Level::Info,
        Severity::Error | Severity::Critical => Level::Error,
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        log!(level(event.severity()), "EVT {:3} | {}", event.id(), event);
    }
}
