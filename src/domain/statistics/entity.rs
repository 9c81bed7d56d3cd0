use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::book::Book;

/// Popular category reported for an empty catalog
pub const NO_POPULAR_CATEGORY: &str = "-";

/// Derived catalog statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_books: usize,
    pub total_categories: usize,

    /// Most frequent category; ties go to the category seen first
    pub popular_category: String,

    pub category_count: BTreeMap<String, usize>,
}

impl CatalogStats {
    pub fn from_books(books: &[Book]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        // Categories in first-seen order, for the tie-break
        let mut seen: Vec<&str> = Vec::new();

        for book in books {
            let count = counts.entry(book.category.as_str()).or_insert(0);
            if *count == 0 {
                seen.push(book.category.as_str());
            }
            *count += 1;
        }

        let mut popular: Option<(&str, usize)> = None;
        for &category in &seen {
            let count = counts[&category];
            if popular.map_or(true, |(_, best)| count > best) {
                popular = Some((category, count));
            }
        }

        Self {
            total_books: books.len(),
            total_categories: seen.len(),
            popular_category: popular
                .map(|(category, _)| category.to_string())
                .unwrap_or_else(|| NO_POPULAR_CATEGORY.to_string()),
            category_count: counts
                .into_iter()
                .map(|(category, count)| (category.to_string(), count))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_books == 0
    }
}

impl Default for CatalogStats {
    fn default() -> Self {
        Self::from_books(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::BookDraft;

    fn book(title: &str, category: &str) -> Book {
        Book::new(BookDraft::new(title, "Author", category)).unwrap()
    }

    #[test]
    fn test_empty_catalog() {
        let stats = CatalogStats::from_books(&[]);
        assert_eq!(stats.total_books, 0);
        assert_eq!(stats.total_categories, 0);
        assert_eq!(stats.popular_category, "-");
        assert!(stats.category_count.is_empty());
    }

    #[test]
    fn test_tie_goes_to_first_seen_category() {
        let books = vec![book("A", "Programming"), book("B", "Fiction")];
        let stats = CatalogStats::from_books(&books);
        assert_eq!(stats.popular_category, "Programming");
        assert_eq!(stats.category_count["Fiction"], 1);
        assert_eq!(stats.category_count["Programming"], 1);
    }

    #[test]
    fn test_most_frequent_wins() {
        let books = vec![
            book("A", "Fiction"),
            book("B", "Programming"),
            book("C", "Programming"),
        ];
        let stats = CatalogStats::from_books(&books);
        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.popular_category, "Programming");
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(CatalogStats::default()).unwrap();
        assert_eq!(json["popularCategory"], "-");
        assert_eq!(json["totalBooks"], 0);
        assert!(json["categoryCount"].as_object().unwrap().is_empty());
    }
}
