//! Observability subsystem for docquery
//!
//! - Structured logging (one JSON line per event)
//! - Monotonic counters
//!
//! Observability is read-only: it never changes query results and its
//! failures never fail a query.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity, DEFAULT_MIN_SEVERITY};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

fn severity_for(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Error
    } else if event.is_detail() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log an event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}
