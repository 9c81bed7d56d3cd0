// src/events/types.rs
//
// All events in the system.
//
// Two families travel on the bus:
// - Change events: facts emitted by the BookStore after a mutation
// - Intent events: user actions emitted by the view/modal for the controller
//
// RULES:
// - Events are immutable
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Book, BookDraft, BookId, BookPatch, BookType};

/// Trait that all events must implement
pub trait DomainEvent: std::fmt::Debug + Clone + Send + Sync {
    /// Stable wire name (`books:changed`, `book:add`, ...)
    const NAME: &'static str;

    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str {
        Self::NAME
    }
}

macro_rules! domain_event {
    ($event:ty, $name:literal) => {
        impl DomainEvent for $event {
            const NAME: &'static str = $name;
            fn event_id(&self) -> Uuid { self.event_id }
            fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
        }
    };
}

// ============================================================================
// STORE CHANGE EVENTS
// ============================================================================

/// Emitted after every mutation with the full collection
#[derive(Debug, Clone, Serialize)]
pub struct BooksChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub books: Vec<Book>,
}

impl BooksChanged {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            books,
        }
    }
}

domain_event!(BooksChanged, "books:changed");

/// Emitted when a book was appended to the collection
#[derive(Debug, Clone, Serialize)]
pub struct BookAdded {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub book: Book,
}

impl BookAdded {
    pub fn new(book: Book) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            book,
        }
    }
}

domain_event!(BookAdded, "book:added");

/// Emitted when a book was updated in place (carries the new state)
#[derive(Debug, Clone, Serialize)]
pub struct BookUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub book: Book,
}

impl BookUpdated {
    pub fn new(book: Book) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            book,
        }
    }
}

domain_event!(BookUpdated, "book:updated");

/// Emitted when a book was removed (carries the removed book)
#[derive(Debug, Clone, Serialize)]
pub struct BookDeleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub book: Book,
}

impl BookDeleted {
    pub fn new(book: Book) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            book,
        }
    }
}

domain_event!(BookDeleted, "book:deleted");

// ============================================================================
// NOTIFICATIONS
// ============================================================================

/// A non-fatal failure the user should hear about
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOccurred {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorOccurred {
    pub fn new(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            message: message.into(),
            details,
        }
    }
}

domain_event!(ErrorOccurred, "error:occurred");

#[derive(Debug, Clone, Serialize)]
pub struct SuccessMessage {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub message: String,
}

impl SuccessMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            message: message.into(),
        }
    }
}

domain_event!(SuccessMessage, "success:message");

// ============================================================================
// INTENT EVENTS (view/modal → controller)
// ============================================================================

/// Form submission for a new book
#[derive(Debug, Clone, Serialize)]
pub struct BookAddRequested {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub book_type: BookType,
    pub draft: BookDraft,
}

impl BookAddRequested {
    pub fn new(book_type: BookType, draft: BookDraft) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            book_type,
            draft,
        }
    }
}

domain_event!(BookAddRequested, "book:add");

/// Form submission for an existing book
#[derive(Debug, Clone, Serialize)]
pub struct BookUpdateRequested {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub book_id: BookId,
    pub patch: BookPatch,
}

impl BookUpdateRequested {
    pub fn new(book_id: BookId, patch: BookPatch) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            book_id,
            patch,
        }
    }
}

domain_event!(BookUpdateRequested, "book:update");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookAction {
    Edit,
    Delete,
}

/// A card action (edit, or an already confirmed delete)
#[derive(Debug, Clone, Serialize)]
pub struct BookSelected {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub book_id: BookId,
    pub action: BookAction,
}

impl BookSelected {
    pub fn new(book_id: BookId, action: BookAction) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            book_id,
            action,
        }
    }
}

domain_event!(BookSelected, "book:selected");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalMode {
    Add,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalOpen {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub mode: ModalMode,
}

impl ModalOpen {
    pub fn new(mode: ModalMode) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            mode,
        }
    }
}

domain_event!(ModalOpen, "modal:open");

#[derive(Debug, Clone, Serialize)]
pub struct ModalClose {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl ModalClose {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

impl Default for ModalClose {
    fn default() -> Self {
        Self::new()
    }
}

domain_event!(ModalClose, "modal:close");

/// Debounced search input
#[derive(Debug, Clone, Serialize)]
pub struct SearchChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub query: String,
}

impl SearchChanged {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            query: query.into(),
        }
    }
}

domain_event!(SearchChanged, "search:changed");

/// Category dropdown change (empty = all categories)
#[derive(Debug, Clone, Serialize)]
pub struct FilterChanged {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub category: String,
}

impl FilterChanged {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            category: category.into(),
        }
    }
}

domain_event!(FilterChanged, "filter:changed");

#[derive(Debug, Clone, Serialize)]
pub struct BooksExportRequested {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl BooksExportRequested {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

impl Default for BooksExportRequested {
    fn default() -> Self {
        Self::new()
    }
}

domain_event!(BooksExportRequested, "books:export");

/// Raw text of an import file, not yet parsed
#[derive(Debug, Clone, Serialize)]
pub struct BooksImportRequested {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub text: String,
}

impl BooksImportRequested {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            text: text.into(),
        }
    }
}

domain_event!(BooksImportRequested, "books:import");
