// src/services/search_debouncer.rs
//
// Search Debouncer - turns keystrokes into SearchChanged events
//
// CRITICAL RULES:
// - Runs in a background task per keystroke
// - A new keystroke aborts the pending task
// - At most one SearchChanged per idle gap, carrying the latest input

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::events::{EventBus, SearchChanged};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

pub struct SearchDebouncer {
    event_bus: Arc<EventBus>,
    delay: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SearchDebouncer {
    pub fn new(event_bus: Arc<EventBus>, delay_ms: u64) -> Self {
        Self {
            event_bus,
            delay: Duration::from_millis(delay_ms),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Record a keystroke. Must be called from within a tokio runtime.
    pub fn input(&self, query: impl Into<String>) {
        let query = query.into();
        let event_bus = Arc::clone(&self.event_bus);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            event_bus.emit(SearchChanged::new(query));
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop any pending keystroke without emitting
    pub fn cancel(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = pending {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
