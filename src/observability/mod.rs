//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Typed lifecycle events
//! - Monotonic counters
//!
//! Observability is read-only: it never changes a resolution or restore
//! outcome, and a failed log write is silently dropped.
//!
//! # Usage
//!
//! ```ignore
//! use chainrestore::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::warn("CATALOG_INCONSISTENT", &[("path", "etc/hosts")]);
//! log_event_with_fields(Event::ChainLoaded, &[("archives", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = match event {
        Event::CatalogInconsistent => Severity::Warn,
        Event::RestoreFile | Event::PathResolved => Severity::Trace,
        e if e.is_failure() => Severity::Error,
        _ => Severity::Info,
    };
    Logger::log(severity, event.as_str(), fields);
}
