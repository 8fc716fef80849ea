use odm_core::{Event, Observer};

use crate::subscriber::view::log_event;

/// Observer that writes every pipeline event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl Observer for Journal {
    fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
