// src/repositories/book_repository.rs
//
// Book collection persistence: one JSON array under one storage key

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Book, BookDraft};
use crate::error::{AppError, AppResult};
use crate::repositories::KeyValueStorage;

/// Storage key of the persisted collection
pub const DEFAULT_STORAGE_KEY: &str = "bookverse_books";

pub trait BookRepository: Send + Sync {
    /// Raw persisted records. Missing data is an empty collection;
    /// unreadable data is an error.
    fn load_all(&self) -> AppResult<Vec<BookDraft>>;

    /// Replace the persisted collection
    fn save_all(&self, books: &[Book]) -> AppResult<()>;
}

pub struct StorageBookRepository {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl StorageBookRepository {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Parse a JSON array of book records.
///
/// Anything that is not valid JSON, or whose top level is not an array, is a
/// parse error.
pub fn parse_book_records(text: &str) -> AppResult<Vec<BookDraft>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| AppError::Parse(format!("Invalid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(AppError::Parse("Expected a JSON array of books".to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Parse(format!("Invalid book record: {}", e)))
}

impl BookRepository for StorageBookRepository {
    fn load_all(&self) -> AppResult<Vec<BookDraft>> {
        match self.storage.get_item(&self.key)? {
            Some(stored) => parse_book_records(&stored),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&self, books: &[Book]) -> AppResult<()> {
        let serialized = serde_json::to_string(books)?;
        self.storage.set_item(&self.key, &serialized)
    }
}
