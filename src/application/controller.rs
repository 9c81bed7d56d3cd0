// src/application/controller.rs
//
// Catalog Controller - coordinates store, view and form
//
// CRITICAL RULES:
// - Reacts to intent events by calling the store
// - Reacts to store change events by redrawing the view
// - Never mutates books itself
// - Store errors become error toasts, never panics
//
// Two filter axes: search text and category (empty = off).
// Visible books = search first, then exact category, AND-combined.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use serde::Serialize;

use crate::application::error_handling::ErrorResponse;
use crate::application::modal::BookForm;
use crate::application::ports::ConfirmationPort;
use crate::application::view::CatalogView;
use crate::domain::{Book, BookDraft, BookId, BookPatch, BookType, CatalogStats};
use crate::error::{AppError, AppResult};
use crate::events::{
    BookAction, BookAddRequested, BookAdded, BookDeleted, BookSelected, BookUpdateRequested,
    BookUpdated, BooksChanged, BooksExportRequested, BooksImportRequested, ErrorOccurred,
    EventBus, FilterChanged, ModalMode, ModalOpen, SearchChanged, SubscriptionId,
    SuccessMessage,
};
use crate::repositories::parse_book_records;
use crate::services::{sample_books, BookStore};

pub const CLEAR_ALL_CONFIRMATION: &str =
    "Are you sure you want to delete ALL books? This cannot be undone!";

#[derive(Default)]
struct FilterState {
    current_books: Vec<Book>,
    search: String,
    category: String,
}

/// Snapshot of what the user is looking at
#[derive(Debug, Clone, Serialize)]
pub struct ControllerState {
    pub books: Vec<Book>,
    pub search: String,
    pub filter: String,
    pub stats: CatalogStats,
}

pub struct CatalogController {
    store: Arc<BookStore>,
    view: Arc<dyn CatalogView>,
    form: Arc<dyn BookForm>,
    event_bus: Arc<EventBus>,
    filters: Mutex<FilterState>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl CatalogController {
    pub fn new(
        store: Arc<BookStore>,
        view: Arc<dyn CatalogView>,
        form: Arc<dyn BookForm>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            view,
            form,
            event_bus,
            filters: Mutex::new(FilterState::default()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    // ========================================================================
    // WIRING
    // ========================================================================

    /// Subscribe to every store and intent event.
    ///
    /// Handlers hold a weak reference, so a dropped controller simply stops
    /// reacting.
    pub fn register_event_handlers(self: &Arc<Self>) {
        let ids = vec![
            self.on::<BooksChanged>(|c, e| c.handle_books_changed(e.books.clone())),
            self.on::<BookAdded>(|c, e| c.handle_book_added(&e.book)),
            self.on::<BookUpdated>(|c, e| c.handle_book_updated(&e.book)),
            self.on::<BookDeleted>(|c, e| c.handle_book_deleted(&e.book)),
            self.on::<BookSelected>(|c, e| c.handle_book_selected(e.book_id, e.action)),
            self.on::<ModalOpen>(|c, e| c.handle_modal_open(e.mode)),
            self.on::<SearchChanged>(|c, e| c.handle_search_changed(&e.query)),
            self.on::<FilterChanged>(|c, e| c.handle_filter_changed(&e.category)),
            self.on::<ErrorOccurred>(|c, e| c.handle_error(e)),
            self.on::<SuccessMessage>(|c, e| c.view.show_success(&e.message)),
            self.on::<BookAddRequested>(|c, e| c.handle_add_book(e.book_type, e.draft.clone())),
            self.on::<BookUpdateRequested>(|c, e| {
                c.handle_update_book(e.book_id, e.patch.clone())
            }),
            self.on::<BooksExportRequested>(|c, _| c.handle_export()),
            self.on::<BooksImportRequested>(|c, e| c.handle_import(&e.text)),
        ];

        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(ids);
    }

    pub fn unregister_event_handlers(&self) {
        let ids: Vec<SubscriptionId> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for id in ids {
            self.event_bus.unsubscribe(id);
        }
    }

    fn on<E>(self: &Arc<Self>, handler: fn(&CatalogController, &E)) -> SubscriptionId
    where
        E: crate::events::DomainEvent + 'static,
    {
        let weak: Weak<Self> = Arc::downgrade(self);
        self.event_bus.subscribe::<E, _>(move |event| {
            if let Some(controller) = weak.upgrade() {
                handler(&controller, event);
            }
        })
    }

    // ========================================================================
    // INITIAL LOAD
    // ========================================================================

    /// Draw the first screen, seeding the sample catalog into an empty store
    /// when `seed_demo_data` is set.
    pub fn load_initial_data(&self, seed_demo_data: bool) {
        self.seed_demo_data_if_empty(seed_demo_data);
        self.update_view();
    }

    /// Import the sample books into an empty catalog when enabled
    pub fn seed_demo_data_if_empty(&self, enabled: bool) {
        if enabled && self.store.is_empty() {
            log::info!("Empty catalog, seeding demo data");
            if let Err(err) = self.store.import_books(sample_books()) {
                self.show_app_error(err);
            }
        }
    }

    // ========================================================================
    // STORE CHANGE EVENTS
    // ========================================================================

    fn handle_books_changed(&self, books: Vec<Book>) {
        self.filters().current_books = books;
        self.apply_filters();
    }

    fn handle_book_added(&self, book: &Book) {
        self.view
            .show_success(&format!("Added book \"{}\" successfully!", book.title));
        self.view.clear_search();
        self.view.clear_filter();
        {
            let mut filters = self.filters();
            filters.search.clear();
            filters.category.clear();
        }
        self.update_view();
    }

    fn handle_book_updated(&self, book: &Book) {
        self.view
            .show_success(&format!("Updated book \"{}\" successfully!", book.title));
        self.update_view();
    }

    fn handle_book_deleted(&self, book: &Book) {
        self.view
            .show_success(&format!("Deleted book \"{}\" successfully!", book.title));
        self.update_view();
    }

    // ========================================================================
    // INTENT EVENTS
    // ========================================================================

    fn handle_book_selected(&self, book_id: BookId, action: BookAction) {
        let Some(book) = self.store.get_by_id(book_id) else {
            self.view.show_error("Book not found!");
            return;
        };

        match action {
            BookAction::Edit => self.form.open_for_edit(&book),
            BookAction::Delete => self.handle_delete_book(book_id),
        }
    }

    /// Open the form on an existing book, leaving error reporting to the caller
    pub fn edit_book(&self, book_id: BookId) -> AppResult<()> {
        if self.store.get_by_id(book_id).is_none() {
            return Err(AppError::NotFound(book_id));
        }
        self.event_bus.emit(BookSelected::new(book_id, BookAction::Edit));
        Ok(())
    }

    fn handle_modal_open(&self, mode: ModalMode) {
        match mode {
            ModalMode::Add => self.form.open_for_add(),
        }
    }

    pub fn handle_search_changed(&self, query: &str) {
        self.filters().search = query.to_string();
        self.apply_filters();
    }

    pub fn handle_filter_changed(&self, category: &str) {
        self.filters().category = category.to_string();
        self.apply_filters();
    }

    fn handle_add_book(&self, book_type: BookType, draft: BookDraft) {
        if let Err(err) = self.store.add_typed(book_type, draft) {
            self.show_app_error(err);
        }
    }

    fn handle_update_book(&self, book_id: BookId, patch: BookPatch) {
        if let Err(err) = self.store.update(book_id, patch) {
            self.show_app_error(err);
        }
    }

    fn handle_delete_book(&self, book_id: BookId) {
        if !self.store.remove(book_id) {
            self.view.show_error("Could not delete the book!");
        }
    }

    fn handle_export(&self) {
        let delivered = self
            .export_books()
            .and_then(|json| self.view.deliver_export(&export_filename(), &json));

        match delivered {
            Ok(()) => self.view.show_success("Exported JSON data"),
            Err(err) => self.show_app_error(err),
        }
    }

    fn handle_import(&self, text: &str) {
        if let Err(err) = self.import_json(text) {
            self.show_app_error(err);
        }
    }

    fn handle_error(&self, event: &ErrorOccurred) {
        match &event.details {
            Some(details) => log::error!("{}: {}", event.message, details),
            None => log::error!("{}", event.message),
        }
        self.view.show_error(&event.message);
    }

    /// Route an error to the user as a toast
    pub fn show_app_error(&self, err: AppError) {
        let response = ErrorResponse::from_app_error(err);
        self.view.show_error(&response.display_message());
    }

    // ========================================================================
    // VIEW STATE
    // ========================================================================

    /// Render the books matching both filter axes
    pub fn apply_filters(&self) {
        let visible = self.visible_books();
        self.view.render_books(&visible);
    }

    /// Reload from the store and redraw list, stats and category options
    pub fn update_view(&self) {
        self.filters().current_books = self.store.get_all();
        self.apply_filters();
        self.view.render_stats(&self.store.get_stats());
        self.view.update_category_filter(&self.store.get_categories());
    }

    /// Set both filter axes at once without redrawing
    pub fn set_filters(&self, search: &str, category: &str) {
        let mut filters = self.filters();
        filters.current_books = self.store.get_all();
        filters.search = search.to_string();
        filters.category = category.to_string();
    }

    pub fn reset_filters(&self) {
        {
            let mut filters = self.filters();
            filters.search.clear();
            filters.category.clear();
        }
        self.view.clear_search();
        self.view.clear_filter();
        self.apply_filters();
    }

    pub fn get_state(&self) -> ControllerState {
        let books = self.visible_books();
        let filters = self.filters();
        ControllerState {
            books,
            search: filters.search.clone(),
            filter: filters.category.clone(),
            stats: self.store.get_stats(),
        }
    }

    fn visible_books(&self) -> Vec<Book> {
        let (current, search, category) = {
            let filters = self.filters();
            (
                filters.current_books.clone(),
                filters.search.clone(),
                filters.category.clone(),
            )
        };

        let mut books = if search.is_empty() {
            current
        } else {
            self.store.search(&search)
        };

        if !category.is_empty() {
            books.retain(|book| book.category == category);
        }

        books
    }

    // ========================================================================
    // IMPORT / EXPORT / CLEAR
    // ========================================================================

    /// Whole collection as a 2-space indented JSON array
    pub fn export_books(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.store.get_all())?)
    }

    /// Parse an import document and append its books. Returns how many were
    /// imported.
    pub fn import_json(&self, text: &str) -> AppResult<usize> {
        let drafts = parse_book_records(text)?;
        self.store.import_books(drafts)
    }

    /// Empty the catalog after confirmation. Returns false when declined.
    pub fn clear_all_books(&self, confirm: &dyn ConfirmationPort) -> bool {
        if !confirm.confirm(CLEAR_ALL_CONFIRMATION) {
            return false;
        }

        self.store.clear();
        self.view.show_success("Deleted all books!");
        true
    }

    fn filters(&self) -> MutexGuard<'_, FilterState> {
        self.filters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `bookverse-<epoch-ms>.json`
pub fn export_filename() -> String {
    format!("bookverse-{}.json", Utc::now().timestamp_millis())
}
