use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::invariants::validate_book;
use crate::domain::DomainResult;

/// Book identifier (epoch milliseconds at creation, unless supplied)
pub type BookId = i64;

/// Last id handed out by `next_book_id`
static LAST_ISSUED_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a fresh book id.
///
/// Ids are derived from the wall clock in milliseconds, but never repeat
/// within a process: two books created in the same millisecond get
/// consecutive ids.
pub fn next_book_id() -> BookId {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ISSUED_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ISSUED_ID.compare_exchange_weak(
            last,
            candidate,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// A single catalog item.
///
/// The serialized form is the persisted/exported record:
/// `{id, title, author, category, cover, description, createdAt}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Internal immutable identifier
    pub id: BookId,

    pub title: String,
    pub author: String,
    pub category: String,

    /// Cover image URL (empty when absent)
    pub cover: String,

    /// Free-form description (empty when absent)
    pub description: String,

    /// Creation timestamp, epoch milliseconds
    pub created_at: i64,
}

/// Raw, unvalidated book record.
///
/// This is what arrives from the form, from storage and from import files.
/// Every field is optional; a `null`, an empty string or a zero id/timestamp
/// counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookDraft {
    pub id: Option<BookId>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub cover: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<i64>,
}

/// Partial update applied by `Book::update`.
///
/// `None` leaves a field alone; `Some("")` clears it (and fails validation
/// for required fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub cover: Option<String>,
    pub description: Option<String>,
}

impl BookDraft {
    /// Draft with the three required fields set
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: BookId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            category: Some(book.category.clone()),
            cover: Some(book.cover.clone()),
            description: Some(book.description.clone()),
            created_at: Some(book.created_at),
        }
    }
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.cover.is_none()
            && self.description.is_none()
    }
}

fn present_text(value: Option<String>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_default()
}

fn present_number(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

impl Book {
    /// Build a book from a raw record, filling `id`/`created_at` and
    /// validating immediately.
    pub fn new(draft: BookDraft) -> DomainResult<Self> {
        let book = Self {
            id: present_number(draft.id).unwrap_or_else(next_book_id),
            title: present_text(draft.title),
            author: present_text(draft.author),
            category: present_text(draft.category),
            cover: present_text(draft.cover),
            description: present_text(draft.description),
            created_at: present_number(draft.created_at)
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        };

        validate_book(&book)?;
        Ok(book)
    }

    /// Rebuild a book from its persisted record
    pub fn from_record(draft: BookDraft) -> DomainResult<Self> {
        Self::new(draft)
    }

    /// Apply a partial update.
    ///
    /// The patch is applied to a staged copy which is validated before being
    /// committed, so an invalid patch never leaves `self` half-updated.
    pub fn update(&mut self, patch: BookPatch) -> DomainResult<()> {
        let mut staged = self.clone();

        if let Some(title) = patch.title {
            staged.title = title;
        }
        if let Some(author) = patch.author {
            staged.author = author;
        }
        if let Some(category) = patch.category {
            staged.category = category;
        }
        if let Some(cover) = patch.cover {
            staged.cover = cover;
        }
        if let Some(description) = patch.description {
            staged.description = description;
        }

        validate_book(&staged)?;
        *self = staged;
        Ok(())
    }

    /// Case-insensitive match of an already lowercased term against
    /// title, author, category and description
    pub fn matches_term(&self, lowered_term: &str) -> bool {
        [&self.title, &self.author, &self.category, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(lowered_term))
    }

    /// Creation time as a UTC datetime (None if the stored value is out of range)
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}
