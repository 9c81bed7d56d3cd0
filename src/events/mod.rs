// src/events/mod.rs
//
// Internal Event System - Public API
//
// The bus is the only channel between the store, the controller and the
// view. Nothing here knows about storage or rendering.

pub mod bus;
pub mod types;

// ============================================================================
// PUBLIC EXPORTS - Event Types and Bus
// ============================================================================

pub use types::DomainEvent;

pub use types::{
    // Store change events
    BookAdded,
    BookDeleted,
    BookUpdated,
    BooksChanged,

    // Notifications
    ErrorOccurred,
    SuccessMessage,

    // Intents
    BookAction,
    BookAddRequested,
    BookSelected,
    BookUpdateRequested,
    BooksExportRequested,
    BooksImportRequested,
    FilterChanged,
    ModalClose,
    ModalMode,
    ModalOpen,
    SearchChanged,
};

pub use bus::{EventBus, EventLogEntry, SubscriptionId};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
