// src/application/modal.rs
//
// Book form modal (add / edit)
//
// RULES:
// - The form never calls the store; submissions leave as intent events
// - An invalid submission emits nothing
// - Every field is trimmed before it leaves the form

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::domain::{Book, BookDraft, BookId, BookPatch, BookType};
use crate::events::{BookAddRequested, BookUpdateRequested, EventBus, ModalClose};

pub const REQUIRED_FIELD_MESSAGE: &str = "This field cannot be empty";

/// Hosts whose result pages are commonly pasted instead of an image address
const SEARCH_PAGE_MARKERS: [&str; 3] = [
    "bing.com/images/search",
    "google.com/search",
    "images.google.com",
];

/// What the controller needs from the form
pub trait BookForm: Send + Sync {
    fn open_for_add(&self);
    fn open_for_edit(&self, book: &Book);
    fn close(&self);
    fn is_open(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
    Category,
    Cover,
    Description,
}

impl FormField {
    pub fn is_required(self) -> bool {
        matches!(self, FormField::Title | FormField::Author | FormField::Category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub title: String,
    pub author: String,
    pub category: String,
    pub cover: String,
    pub description: String,
}

impl FormFields {
    fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Category => &self.category,
            FormField::Cover => &self.cover,
            FormField::Description => &self.description,
        }
    }

    fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
            FormField::Category => &mut self.category,
            FormField::Cover => &mut self.cover,
            FormField::Description => &mut self.description,
        }
    }

    fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            category: self.category.trim().to_string(),
            cover: self.cover.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }

    fn validation_errors(&self, category_required: bool) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push("Book title cannot be empty".to_string());
        }
        if self.author.is_empty() {
            errors.push("Author cannot be empty".to_string());
        }
        if category_required && self.category.is_empty() {
            errors.push("Category cannot be empty".to_string());
        }
        errors
    }
}

/// Live preview state of the cover URL field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverPreview {
    Empty,
    /// A search-engine results page, not an image address
    SearchPage,
    InvalidUrl,
    Image(Url),
}

impl CoverPreview {
    pub fn message(&self) -> &'static str {
        match self {
            CoverPreview::Empty => "Paste an image URL to preview it",
            CoverPreview::SearchPage => {
                "This is a search results link, not an image. Copy the image address instead"
            }
            CoverPreview::InvalidUrl => "Enter a valid image URL (starting with http:// or https://)",
            CoverPreview::Image(_) => "Loading image...",
        }
    }
}

pub fn classify_cover_url(raw: &str) -> CoverPreview {
    let raw = raw.trim();
    if raw.is_empty() {
        return CoverPreview::Empty;
    }
    if SEARCH_PAGE_MARKERS.iter().any(|marker| raw.contains(marker)) {
        return CoverPreview::SearchPage;
    }

    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => CoverPreview::Image(url),
        _ => CoverPreview::InvalidUrl,
    }
}

#[derive(Default)]
struct ModalState {
    is_open: bool,
    current_book_id: Option<BookId>,
    book_type: BookType,
    fields: FormFields,
}

impl ModalState {
    /// Typed additions may leave the category to the factory default
    fn category_required(&self) -> bool {
        self.current_book_id.is_some() || !self.book_type.has_defaults()
    }
}

pub struct BookFormModal {
    event_bus: Arc<EventBus>,
    state: Mutex<ModalState>,
}

impl BookFormModal {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            state: Mutex::new(ModalState::default()),
        }
    }

    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        *self.state().fields.get_mut(field) = value.into();
    }

    /// Creation defaults for new books; ignored when editing
    pub fn set_book_type(&self, book_type: BookType) {
        self.state().book_type = book_type;
    }

    pub fn fields(&self) -> FormFields {
        self.state().fields.clone()
    }

    pub fn current_book_id(&self) -> Option<BookId> {
        self.state().current_book_id
    }

    pub fn is_edit_mode(&self) -> bool {
        self.current_book_id().is_some()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_edit_mode() {
            "Edit Book"
        } else {
            "Add New Book"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_edit_mode() {
            "Update"
        } else {
            "Add book"
        }
    }

    /// Inline error for one field, if any
    pub fn field_error(&self, field: FormField) -> Option<&'static str> {
        let state = self.state();
        let required = match field {
            FormField::Category => state.category_required(),
            other => other.is_required(),
        };
        (required && state.fields.get(field).trim().is_empty()).then_some(REQUIRED_FIELD_MESSAGE)
    }

    /// Submit is enabled only when every required field has content
    pub fn is_submittable(&self) -> bool {
        let state = self.state();
        state
            .fields
            .trimmed()
            .validation_errors(state.category_required())
            .is_empty()
    }

    pub fn cover_preview(&self) -> CoverPreview {
        classify_cover_url(&self.state().fields.cover)
    }

    /// Validate and publish the form.
    ///
    /// Emits `BookUpdateRequested` in edit mode, `BookAddRequested` otherwise,
    /// then closes. Returns the validation messages when nothing was sent.
    pub fn submit(&self) -> Result<(), Vec<String>> {
        let (fields, current_id, book_type, category_required) = {
            let state = self.state();
            (
                state.fields.trimmed(),
                state.current_book_id,
                state.book_type,
                state.category_required(),
            )
        };

        let errors = fields.validation_errors(category_required);
        if !errors.is_empty() {
            log::debug!("Form rejected: {}", errors.join("; "));
            return Err(errors);
        }

        match current_id {
            Some(book_id) => {
                let patch = BookPatch {
                    title: Some(fields.title),
                    author: Some(fields.author),
                    category: Some(fields.category),
                    cover: Some(fields.cover),
                    description: Some(fields.description),
                };
                self.event_bus.emit(BookUpdateRequested::new(book_id, patch));
            }
            None => {
                let mut draft = BookDraft::new(fields.title, fields.author, fields.category);
                if !fields.cover.is_empty() {
                    draft = draft.with_cover(fields.cover);
                }
                if !fields.description.is_empty() {
                    draft = draft.with_description(fields.description);
                }
                self.event_bus.emit(BookAddRequested::new(book_type, draft));
            }
        }

        self.close();
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, ModalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookForm for BookFormModal {
    fn open_for_add(&self) {
        let mut state = self.state();
        *state = ModalState {
            is_open: true,
            ..ModalState::default()
        };
    }

    fn open_for_edit(&self, book: &Book) {
        let mut state = self.state();
        *state = ModalState {
            is_open: true,
            current_book_id: Some(book.id),
            book_type: BookType::General,
            fields: FormFields {
                title: book.title.clone(),
                author: book.author.clone(),
                category: book.category.clone(),
                cover: book.cover.clone(),
                description: book.description.clone(),
            },
        };
    }

    fn close(&self) {
        let was_open = {
            let mut state = self.state();
            let was_open = state.is_open;
            *state = ModalState::default();
            was_open
        };

        if was_open {
            self.event_bus.emit(ModalClose::new());
        }
    }

    fn is_open(&self) -> bool {
        self.state().is_open
    }
}
