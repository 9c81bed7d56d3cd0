use serde::{Deserialize, Serialize};

use super::entity::{Book, BookDraft};
use crate::domain::DomainResult;

/// Kind of book, used to pick creation defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookType {
    Comic,
    Novel,
    Textbook,
    #[default]
    General,
}

impl BookType {
    /// Parse a type tag. Unknown tags fall back to `General`.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "comic" => BookType::Comic,
            "novel" => BookType::Novel,
            "textbook" => BookType::Textbook,
            _ => BookType::General,
        }
    }

    pub fn all() -> [BookType; 4] {
        [
            BookType::Comic,
            BookType::Novel,
            BookType::Textbook,
            BookType::General,
        ]
    }

    /// Whether creation fills in a missing category
    pub fn has_defaults(self) -> bool {
        self.defaults().is_some()
    }

    /// (category, description) defaults for this type
    fn defaults(self) -> Option<(&'static str, &'static str)> {
        match self {
            BookType::Comic => Some(("Comics", "Comic book with vivid illustrations")),
            BookType::Novel => Some(("Novel", "Literary fiction with a compelling plot")),
            BookType::Textbook => Some(("Textbook", "Specialized academic textbook")),
            BookType::General => None,
        }
    }
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookType::Comic => write!(f, "comic"),
            BookType::Novel => write!(f, "novel"),
            BookType::Textbook => write!(f, "textbook"),
            BookType::General => write!(f, "general"),
        }
    }
}

/// Creates books with type-specific defaults
pub struct BookFactory;

impl BookFactory {
    /// Create a book of the given type.
    ///
    /// Category and description defaults are applied only when the draft
    /// leaves them absent.
    pub fn create(book_type: BookType, mut draft: BookDraft) -> DomainResult<Book> {
        if let Some((category, description)) = book_type.defaults() {
            if is_absent(&draft.category) {
                draft.category = Some(category.to_string());
            }
            if is_absent(&draft.description) {
                draft.description = Some(description.to_string());
            }
        }

        Book::new(draft)
    }

    /// Build every draft or none of them
    pub fn create_multiple(drafts: Vec<BookDraft>) -> DomainResult<Vec<Book>> {
        drafts.into_iter().map(Book::new).collect()
    }

    pub fn create_comic(draft: BookDraft) -> DomainResult<Book> {
        Self::create(BookType::Comic, draft)
    }

    pub fn create_novel(draft: BookDraft) -> DomainResult<Book> {
        Self::create(BookType::Novel, draft)
    }

    pub fn create_textbook(draft: BookDraft) -> DomainResult<Book> {
        Self::create(BookType::Textbook, draft)
    }

    pub fn create_general(draft: BookDraft) -> DomainResult<Book> {
        Self::create(BookType::General, draft)
    }
}

fn is_absent(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untyped(title: &str) -> BookDraft {
        BookDraft {
            title: Some(title.to_string()),
            author: Some("Anonymous".to_string()),
            ..BookDraft::default()
        }
    }

    #[test]
    fn test_comic_fills_missing_defaults() {
        let book = BookFactory::create_comic(untyped("Akira")).unwrap();
        assert_eq!(book.category, "Comics");
        assert_eq!(book.description, "Comic book with vivid illustrations");
    }

    #[test]
    fn test_typed_defaults_never_override_caller_values() {
        let draft = BookDraft::new("Dune", "Frank Herbert", "Science Fiction")
            .with_description("Desert planet politics");
        let book = BookFactory::create_novel(draft).unwrap();
        assert_eq!(book.category, "Science Fiction");
        assert_eq!(book.description, "Desert planet politics");
    }

    #[test]
    fn test_general_applies_no_defaults() {
        assert!(BookFactory::create_general(untyped("Untitled Notes")).is_err());
    }

    #[test]
    fn test_unknown_tag_is_general() {
        assert_eq!(BookType::parse("magazine"), BookType::General);
        assert_eq!(BookType::parse(" TextBook "), BookType::Textbook);
    }

    #[test]
    fn test_create_multiple_is_all_or_nothing() {
        let drafts = vec![
            BookDraft::new("Dune", "Frank Herbert", "Fiction"),
            BookDraft::new("", "Nobody", "Fiction"),
        ];
        assert!(BookFactory::create_multiple(drafts).is_err());
    }
}
