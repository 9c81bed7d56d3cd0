// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod book_store;
pub mod demo_loader;
pub mod search_debouncer;

#[cfg(test)]
mod book_store_tests;

// Re-export all services and their types
pub use book_store::BookStore;

pub use demo_loader::{sample_books, DemoLoader};

pub use search_debouncer::{SearchDebouncer, DEFAULT_DEBOUNCE_MS};
