//! Observability subsystem
//!
//! Structured JSON logging with typed events. Observability is read-only:
//! nothing here affects a validation verdict.
//!
//! ```ignore
//! use placegraph::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::ValidationRejected, &[("id", "hall")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a typed event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a typed event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // This just verifies no panic
        log_event(Event::SchemasLoaded);
        log_event_with_fields(Event::StoreCheckBegin, &[("store_dir", "/tmp/test")]);
    }
}
