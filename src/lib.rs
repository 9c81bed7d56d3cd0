// src/lib.rs
// BookVerse - Local-first personal book catalog
//
// Architecture:
// - Domain-centric: Book rules live in the domain (validation, factory, stats)
// - Event-driven: Store, controller, view and form coordinate through the bus
// - Explicit: One store, built once, shared as Arc; no global state
// - Local-first: The catalog lives in a local SQLite key-value table
// - Application Layer: Controller, view and form behind ports

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{
    next_book_id, validate_book, Book, BookDraft, BookFactory, BookId, BookPatch, BookType,
    CatalogStats, DomainError, DomainResult, NO_POPULAR_CATEGORY,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    // Intents
    BookAction,
    // Store changes
    BookAdded,
    BookAddRequested,
    BookDeleted,
    BookSelected,
    BookUpdateRequested,
    BookUpdated,
    BooksChanged,
    BooksExportRequested,
    BooksImportRequested,
    DomainEvent,
    // Notifications
    ErrorOccurred,
    EventBus,
    EventLogEntry,
    FilterChanged,
    ModalClose,
    ModalMode,
    ModalOpen,
    SearchChanged,
    SubscriptionId,
    SuccessMessage,
};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    parse_book_records, BookRepository, InMemoryKeyValueStorage, KeyValueStorage,
    SqliteKeyValueStorage, StorageBookRepository, DEFAULT_STORAGE_KEY,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{sample_books, BookStore, DemoLoader, SearchDebouncer};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{
    AppConfig, AppState, BookForm, BookFormModal, CatalogController, CatalogView,
    ConfirmationPort, ErrorResponse, TerminalView, TextSource,
};
