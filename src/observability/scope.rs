//! ObservationScope for automatic begin/complete logging
//!
//! - Logs `{event}_BEGIN` on creation
//! - Logs `{event}_COMPLETE` when `complete()` is called
//! - Logs `{event}_ERROR` on drop if never completed

use std::cell::Cell;
use std::time::Instant;

use tracing::{error, info};

use super::events::Event;

/// A scope around one pipeline phase.
///
/// ```ignore
/// let scope = ObservationScope::new(Event::Validate, "customers");
/// let report = validate(schema, &rows)?; // early return logs VALIDATE_ERROR
/// scope.complete();
/// ```
pub struct ObservationScope<'a> {
    event: Event,
    entity: &'a str,
    started: Instant,
    completed: Cell<bool>,
}

impl<'a> ObservationScope<'a> {
    pub fn new(event: Event, entity: &'a str) -> Self {
        info!(entity, "{}_BEGIN", event.as_str());
        Self {
            event,
            entity,
            started: Instant::now(),
            completed: Cell::new(false),
        }
    }

    /// Marks the scope complete, logging elapsed time.
    pub fn complete(self) {
        self.completed.set(true);
        info!(
            entity = self.entity,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "{}_COMPLETE",
            self.event.as_str()
        );
    }
}

impl Drop for ObservationScope<'_> {
    fn drop(&mut self) {
        if !self.completed.get() {
            error!(
                entity = self.entity,
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "{}_ERROR",
                self.event.as_str()
            );
        }
    }
}
