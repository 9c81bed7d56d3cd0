//! Critical Book Invariants:
//!
//! 1. Title, author and category are never blank (after trimming)
//! 2. Identity (id) is immutable once assigned
//! 3. Creation timestamp never changes
//! 4. Cover and description are optional and default to empty strings
//! 5. A failed update leaves the book exactly as it was

pub mod entity;
pub mod factory;
pub mod invariants;

pub use entity::{next_book_id, Book, BookDraft, BookId, BookPatch};
pub use factory::{BookFactory, BookType};
pub use invariants::validate_book;
