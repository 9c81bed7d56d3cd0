// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod book;
pub mod statistics;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Book Domain
pub use book::{
    next_book_id, validate_book, Book, BookDraft, BookFactory, BookId, BookPatch, BookType,
};

// Statistics Domain (Derived Data)
pub use statistics::{CatalogStats, NO_POPULAR_CATEGORY};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Book {0} cannot be empty")]
    MissingField(&'static str),

    #[error("Book id {0} is already in use")]
    DuplicateId(BookId),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
