use super::entity::Book;
use crate::domain::{DomainError, DomainResult};

/// Validates all Book invariants
pub fn validate_book(book: &Book) -> DomainResult<()> {
    validate_required("title", &book.title)?;
    validate_required("author", &book.author)?;
    validate_required("category", &book.category)?;
    Ok(())
}

/// Required text fields cannot be blank
fn validate_required(field: &'static str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::MissingField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::BookDraft;

    #[test]
    fn test_valid_book() {
        let book = Book::new(BookDraft::new("Dune", "Frank Herbert", "Fiction")).unwrap();
        assert!(validate_book(&book).is_ok());
    }

    #[test]
    fn test_whitespace_author_fails() {
        let mut book = Book::new(BookDraft::new("Dune", "Frank Herbert", "Fiction")).unwrap();
        book.author = "\t ".to_string();
        let err = validate_book(&book).unwrap_err();
        assert_eq!(err.to_string(), "Book author cannot be empty");
    }
}
