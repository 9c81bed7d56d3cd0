// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO event emission

pub mod book_repository;
pub mod storage_repository;

pub use book_repository::{
    parse_book_records, BookRepository, StorageBookRepository, DEFAULT_STORAGE_KEY,
};
pub use storage_repository::{InMemoryKeyValueStorage, KeyValueStorage, SqliteKeyValueStorage};

#[cfg(test)]
pub use storage_repository::MockKeyValueStorage;
