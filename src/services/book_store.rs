// src/services/book_store.rs
//
// Book Store - sole owner of the book collection
//
// CRITICAL RULES:
// - The in-memory collection is only mutated here
// - Every mutation is persisted through the BookRepository
// - Every mutation emits change events, AFTER the lock is released
// - Accessors hand out clones, never the live collection
// - Storage failures are reported as events, never returned

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::{
    next_book_id, Book, BookDraft, BookFactory, BookId, BookPatch, BookType, CatalogStats,
    DomainError,
};
use crate::error::{AppError, AppResult};
use crate::events::{
    BookAdded, BookDeleted, BookUpdated, BooksChanged, ErrorOccurred, EventBus, SuccessMessage,
};
use crate::repositories::BookRepository;

pub struct BookStore {
    repository: Arc<dyn BookRepository>,
    event_bus: Arc<EventBus>,
    books: RwLock<Vec<Book>>,
}

impl BookStore {
    /// Create an empty store. Call `load_from_storage` to read persisted books.
    pub fn new(repository: Arc<dyn BookRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            repository,
            event_bus,
            books: RwLock::new(Vec::new()),
        }
    }

    /// Create a store and load the persisted collection
    pub fn open(repository: Arc<dyn BookRepository>, event_bus: Arc<EventBus>) -> Self {
        let store = Self::new(repository, event_bus);
        store.load_from_storage();
        store
    }

    /// Replace the in-memory collection with the persisted one.
    ///
    /// Unreadable or invalid data leaves an empty collection and emits
    /// `ErrorOccurred`.
    pub fn load_from_storage(&self) {
        let loaded = self
            .repository
            .load_all()
            .and_then(|drafts| BookFactory::create_multiple(drafts).map_err(AppError::from));

        match loaded {
            Ok(books) => {
                log::info!("Loaded {} books from storage", books.len());
                *self.books.write().unwrap_or_else(PoisonError::into_inner) = books;
            }
            Err(err) => {
                log::error!("Error loading books from storage: {}", err);
                self.books
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clear();
                self.event_bus.emit(ErrorOccurred::new(
                    "Could not load books from storage",
                    Some(err.to_string()),
                ));
            }
        }
    }

    /// Persist the current collection. Returns false (and emits
    /// `ErrorOccurred`) if the write failed.
    pub fn save_to_storage(&self) -> bool {
        let result = {
            let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
            self.repository.save_all(&books)
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                self.report_save_failure(err);
                false
            }
        }
    }

    pub fn get_all(&self) -> Vec<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_by_id(&self, id: BookId) -> Option<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|book| book.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.books.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a general book
    pub fn add(&self, draft: BookDraft) -> AppResult<Book> {
        self.add_typed(BookType::General, draft)
    }

    /// Validate, append and persist a new book.
    ///
    /// Emits `BookAdded` then `BooksChanged`. On error the collection is
    /// unchanged.
    pub fn add_typed(&self, book_type: BookType, draft: BookDraft) -> AppResult<Book> {
        let book = BookFactory::create(book_type, draft)?;

        let (book, all) = self.commit(|books| {
            if books.iter().any(|existing| existing.id == book.id) {
                return Err(DomainError::DuplicateId(book.id).into());
            }
            books.push(book.clone());
            Ok(book)
        })?;

        log::info!("Added book {} \"{}\"", book.id, book.title);
        self.event_bus.emit(BookAdded::new(book.clone()));
        self.event_bus.emit(BooksChanged::new(all));

        Ok(book)
    }

    /// Apply a partial update to an existing book.
    ///
    /// Emits `BookUpdated` then `BooksChanged`.
    pub fn update(&self, id: BookId, patch: BookPatch) -> AppResult<Book> {
        let (book, all) = self.commit(|books| {
            let book = books
                .iter_mut()
                .find(|book| book.id == id)
                .ok_or(AppError::NotFound(id))?;
            book.update(patch)?;
            Ok(book.clone())
        })?;

        log::info!("Updated book {} \"{}\"", book.id, book.title);
        self.event_bus.emit(BookUpdated::new(book.clone()));
        self.event_bus.emit(BooksChanged::new(all));

        Ok(book)
    }

    /// Remove a book. Returns false if no book has this id.
    ///
    /// Emits `BookDeleted` then `BooksChanged`.
    pub fn remove(&self, id: BookId) -> bool {
        let removed = self.commit(|books| {
            let position = books
                .iter()
                .position(|book| book.id == id)
                .ok_or(AppError::NotFound(id))?;
            Ok(books.remove(position))
        });

        match removed {
            Ok((book, all)) => {
                log::info!("Removed book {} \"{}\"", book.id, book.title);
                self.event_bus.emit(BookDeleted::new(book));
                self.event_bus.emit(BooksChanged::new(all));
                true
            }
            Err(_) => {
                log::debug!("Remove ignored: book {} not found", id);
                false
            }
        }
    }

    /// Case-insensitive substring search over title, author, category and
    /// description. A blank query returns every book.
    pub fn search(&self, query: &str) -> Vec<Book> {
        if query.trim().is_empty() {
            return self.get_all();
        }

        let term = query.to_lowercase();
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|book| book.matches_term(&term))
            .cloned()
            .collect()
    }

    /// Exact category match. An empty category returns every book.
    pub fn filter_by_category(&self, category: &str) -> Vec<Book> {
        if category.is_empty() {
            return self.get_all();
        }

        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|book| book.category == category)
            .cloned()
            .collect()
    }

    /// Distinct categories, sorted ascending
    pub fn get_categories(&self) -> Vec<String> {
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        books
            .iter()
            .map(|book| book.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn get_stats(&self) -> CatalogStats {
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        CatalogStats::from_books(&books)
    }

    /// Append a batch of records.
    ///
    /// Every record is validated before anything is appended, so one bad
    /// record rejects the whole batch. Ids already used by the collection (or
    /// by an earlier record of the batch) are replaced with fresh ones.
    /// Emits `BooksChanged` then `SuccessMessage`.
    pub fn import_books(&self, drafts: Vec<BookDraft>) -> AppResult<usize> {
        let imported = BookFactory::create_multiple(drafts)?;

        let (count, all) = self.commit(|books| {
            let mut taken: HashSet<BookId> = books.iter().map(|book| book.id).collect();
            let count = imported.len();

            for mut book in imported {
                if !taken.insert(book.id) {
                    let fresh = loop {
                        let candidate = next_book_id();
                        if !taken.contains(&candidate) {
                            break candidate;
                        }
                    };
                    log::warn!(
                        "Imported book \"{}\" reuses id {}; assigned {}",
                        book.title,
                        book.id,
                        fresh
                    );
                    book.id = fresh;
                    taken.insert(fresh);
                }
                books.push(book);
            }

            Ok(count)
        })?;

        log::info!("Imported {} books", count);
        self.event_bus.emit(BooksChanged::new(all));
        self.event_bus
            .emit(SuccessMessage::new(format!("Imported {} books", count)));

        Ok(count)
    }

    /// Remove every book. Emits `BooksChanged`.
    pub fn clear(&self) {
        // Clearing cannot fail
        if let Ok(((), all)) = self.commit(|books| {
            books.clear();
            Ok(())
        }) {
            log::info!("Cleared the catalog");
            self.event_bus.emit(BooksChanged::new(all));
        }
    }

    /// Run a mutation under the write lock, persist the result and return a
    /// snapshot of the new collection.
    ///
    /// `mutate` must leave the collection untouched when it fails. A failed
    /// save keeps the in-memory change and is reported through the bus.
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<Book>) -> AppResult<T>,
    ) -> AppResult<(T, Vec<Book>)> {
        let (value, snapshot, save_result) = {
            let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
            let value = mutate(&mut books)?;
            let save_result = self.repository.save_all(&books);
            (value, books.clone(), save_result)
        };

        if let Err(err) = save_result {
            self.report_save_failure(err);
        }

        Ok((value, snapshot))
    }

    fn report_save_failure(&self, err: AppError) {
        log::error!("Error saving books to storage: {}", err);
        self.event_bus.emit(ErrorOccurred::new(
            "Could not save books to storage",
            Some(err.to_string()),
        ));
    }
}
