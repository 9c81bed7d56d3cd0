// src/services/book_store_tests.rs
//
// UNIT TESTS: Book Store
//
// PURPOSE:
// - Prove that every mutation is persisted and announced
// - Prove that rejected operations leave the collection untouched
// - Prove that storage failures surface as ErrorOccurred, not as panics
//
// INVARIANTS TESTED:
// - Ids stay unique after add and import
// - The persisted collection always mirrors the in-memory one
// - Change events arrive after the mutation is visible
// - Import is all-or-nothing

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use crate::domain::{Book, BookDraft};
    use crate::events::{
        BookAdded, BookDeleted, BookUpdated, BooksChanged, ErrorOccurred, EventBus,
        SuccessMessage,
    };
    use crate::repositories::{InMemoryKeyValueStorage, StorageBookRepository};
    use crate::services::BookStore;

    pub struct Fixture {
        pub store: Arc<BookStore>,
        pub bus: Arc<EventBus>,
        pub storage: Arc<InMemoryKeyValueStorage>,
        pub events: Arc<Mutex<Vec<String>>>,
    }

    impl Fixture {
        pub fn recorded(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn clear_recorded(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    pub fn fixture() -> Fixture {
        let storage = Arc::new(InMemoryKeyValueStorage::new());
        fixture_with(storage)
    }

    pub fn fixture_with(storage: Arc<InMemoryKeyValueStorage>) -> Fixture {
        let bus = Arc::new(EventBus::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        record_events(&bus, &events);

        let repo = Arc::new(StorageBookRepository::new(storage.clone()));
        let store = Arc::new(BookStore::open(repo, bus.clone()));

        Fixture {
            store,
            bus,
            storage,
            events,
        }
    }

    pub fn record_events(bus: &EventBus, events: &Arc<Mutex<Vec<String>>>) {
        let log = events.clone();
        bus.subscribe::<BookAdded, _>(move |e| {
            log.lock().unwrap().push(format!("added:{}", e.book.title));
        });
        let log = events.clone();
        bus.subscribe::<BookUpdated, _>(move |e| {
            log.lock().unwrap().push(format!("updated:{}", e.book.title));
        });
        let log = events.clone();
        bus.subscribe::<BookDeleted, _>(move |e| {
            log.lock().unwrap().push(format!("deleted:{}", e.book.title));
        });
        let log = events.clone();
        bus.subscribe::<BooksChanged, _>(move |e| {
            log.lock().unwrap().push(format!("changed:{}", e.books.len()));
        });
        let log = events.clone();
        bus.subscribe::<ErrorOccurred, _>(move |e| {
            log.lock().unwrap().push(format!("error:{}", e.message));
        });
        let log = events.clone();
        bus.subscribe::<SuccessMessage, _>(move |e| {
            log.lock().unwrap().push(format!("success:{}", e.message));
        });
    }

    pub fn draft(title: &str, author: &str, category: &str) -> BookDraft {
        BookDraft::new(title, author, category)
    }

    pub fn seed(store: &BookStore) -> Vec<Book> {
        vec![
            store
                .add(draft("Clean Code", "Robert C. Martin", "Programming").with_id(1))
                .unwrap(),
            store
                .add(draft("Dune", "Frank Herbert", "Fiction").with_id(2))
                .unwrap(),
            store
                .add(
                    draft("Refactoring", "Martin Fowler", "Programming")
                        .with_id(3)
                        .with_description("Improving the design of existing code"),
                )
                .unwrap(),
        ]
    }
}

#[cfg(test)]
mod mutation_tests {
    use super::support::*;
    use crate::domain::{BookPatch, BookType, DomainError};
    use crate::error::AppError;
    use crate::repositories::{parse_book_records, KeyValueStorage, DEFAULT_STORAGE_KEY};

    fn persisted_titles(fx: &Fixture) -> Vec<String> {
        let raw = fx.storage.get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        parse_book_records(&raw)
            .unwrap()
            .into_iter()
            .filter_map(|d| d.title)
            .collect()
    }

    #[test]
    fn test_add_persists_and_emits_in_order() {
        let fx = fixture();

        let book = fx.store.add(draft("Dune", "Frank Herbert", "Fiction")).unwrap();

        assert!(book.id > 0);
        assert!(book.created_at > 0);
        assert_eq!(fx.store.len(), 1);
        assert_eq!(persisted_titles(&fx), vec!["Dune"]);
        assert_eq!(fx.recorded(), vec!["added:Dune", "changed:1"]);
    }

    #[test]
    fn test_add_typed_applies_type_defaults() {
        let fx = fixture();

        let comic = fx
            .store
            .add_typed(BookType::Comic, draft("Watchmen", "Alan Moore", ""))
            .unwrap();

        assert_eq!(comic.category, "Comics");
        assert_eq!(comic.description, "Comic book with vivid illustrations");
    }

    #[test]
    fn test_add_missing_field_leaves_collection_untouched() {
        let fx = fixture();
        seed(&fx.store);
        fx.clear_recorded();

        let err = fx.store.add(draft("", "Someone", "Fiction")).unwrap_err();

        assert_eq!(err.to_string(), "Book title cannot be empty");
        assert!(err.is_validation());
        assert_eq!(fx.store.len(), 3);
        assert!(fx.recorded().is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let fx = fixture();
        seed(&fx.store);

        let err = fx
            .store
            .add(draft("Another", "Author", "Fiction").with_id(2))
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(DomainError::DuplicateId(2))));
        assert_eq!(fx.store.len(), 3);
    }

    #[test]
    fn test_consecutive_adds_get_distinct_ids() {
        let fx = fixture();
        let a = fx.store.add(draft("A", "X", "C")).unwrap();
        let b = fx.store.add(draft("B", "X", "C")).unwrap();
        let c = fx.store.add(draft("C", "X", "C")).unwrap();

        assert!(a.id < b.id && b.id < c.id);
    }

    #[test]
    fn test_update_changes_only_patched_fields() {
        let fx = fixture();
        let original = seed(&fx.store).remove(1);
        fx.clear_recorded();

        let updated = fx
            .store
            .update(
                original.id,
                BookPatch {
                    title: Some("Dune Messiah".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.author, original.author);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(fx.store.get_by_id(original.id), Some(updated));
        assert_eq!(fx.recorded(), vec!["updated:Dune Messiah", "changed:3"]);
        assert!(persisted_titles(&fx).contains(&"Dune Messiah".to_string()));
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let fx = fixture();
        seed(&fx.store);
        fx.clear_recorded();

        let err = fx.store.update(99, BookPatch::default()).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Book 99 not found");
        assert!(fx.recorded().is_empty());
    }

    #[test]
    fn test_update_with_empty_author_is_rejected_atomically() {
        let fx = fixture();
        seed(&fx.store);
        let before = fx.store.get_by_id(1).unwrap();

        let err = fx
            .store
            .update(
                1,
                BookPatch {
                    title: Some("New Title".to_string()),
                    author: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.to_string(), "Book author cannot be empty");
        assert_eq!(fx.store.get_by_id(1), Some(before));
    }

    #[test]
    fn test_remove_existing_and_missing() {
        let fx = fixture();
        seed(&fx.store);
        fx.clear_recorded();

        assert!(fx.store.remove(2));
        assert_eq!(fx.recorded(), vec!["deleted:Dune", "changed:2"]);
        assert_eq!(fx.store.get_by_id(2), None);
        assert_eq!(persisted_titles(&fx), vec!["Clean Code", "Refactoring"]);

        fx.clear_recorded();
        assert!(!fx.store.remove(2));
        assert!(fx.recorded().is_empty());
        assert_eq!(fx.store.len(), 2);
    }

    #[test]
    fn test_clear_empties_store_and_storage() {
        let fx = fixture();
        seed(&fx.store);
        fx.clear_recorded();

        fx.store.clear();

        assert!(fx.store.is_empty());
        assert!(persisted_titles(&fx).is_empty());
        assert_eq!(fx.recorded(), vec!["changed:0"]);
    }

    #[test]
    fn test_accessors_return_copies() {
        let fx = fixture();
        seed(&fx.store);

        let mut books = fx.store.get_all();
        books.clear();

        assert_eq!(fx.store.len(), 3);
    }

    #[test]
    fn test_change_listener_sees_new_state() {
        let fx = fixture();
        let store = fx.store.clone();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(0usize));
        let sink = seen.clone();

        fx.bus
            .subscribe::<crate::events::BooksChanged, _>(move |_| {
                *sink.lock().unwrap() = store.len();
            });

        fx.store.add(draft("Dune", "Frank Herbert", "Fiction")).unwrap();
        assert_eq!(*seen.lock().unwrap(), 1);
    }
}

#[cfg(test)]
mod query_tests {
    use super::support::*;
    use crate::domain::NO_POPULAR_CATEGORY;

    #[test]
    fn test_search_is_case_insensitive_over_all_text_fields() {
        let fx = fixture();
        seed(&fx.store);

        let titles = |q: &str| -> Vec<String> {
            fx.store.search(q).into_iter().map(|b| b.title).collect()
        };

        assert_eq!(titles("CLEAN"), vec!["Clean Code"]);
        assert_eq!(titles("herbert"), vec!["Dune"]);
        assert_eq!(titles("programming"), vec!["Clean Code", "Refactoring"]);
        assert_eq!(titles("existing code"), vec!["Refactoring"]);
        assert!(titles("nothing here").is_empty());
    }

    #[test]
    fn test_blank_search_returns_everything() {
        let fx = fixture();
        seed(&fx.store);

        assert_eq!(fx.store.search("").len(), 3);
        assert_eq!(fx.store.search("   ").len(), 3);
    }

    #[test]
    fn test_filter_by_category_is_exact() {
        let fx = fixture();
        seed(&fx.store);

        assert_eq!(fx.store.filter_by_category("Programming").len(), 2);
        assert_eq!(fx.store.filter_by_category("programming").len(), 0);
        assert_eq!(fx.store.filter_by_category("").len(), 3);
    }

    #[test]
    fn test_categories_are_distinct_and_sorted() {
        let fx = fixture();
        seed(&fx.store);

        assert_eq!(fx.store.get_categories(), vec!["Fiction", "Programming"]);
    }

    #[test]
    fn test_stats() {
        let fx = fixture();
        assert_eq!(fx.store.get_stats().popular_category, NO_POPULAR_CATEGORY);

        seed(&fx.store);
        let stats = fx.store.get_stats();

        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.popular_category, "Programming");
        assert_eq!(stats.category_count.get("Fiction"), Some(&1));
    }
}

#[cfg(test)]
mod import_tests {
    use super::support::*;
    use crate::domain::BookDraft;
    use std::collections::HashSet;

    #[test]
    fn test_import_appends_and_announces() {
        let fx = fixture();
        seed(&fx.store);
        fx.clear_recorded();

        let count = fx
            .store
            .import_books(vec![
                draft("Neuromancer", "William Gibson", "Fiction").with_id(100),
                draft("SICP", "Abelson", "Programming").with_id(101),
            ])
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(fx.store.len(), 5);
        assert_eq!(fx.recorded(), vec!["changed:5", "success:Imported 2 books"]);
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let fx = fixture();
        seed(&fx.store);
        fx.clear_recorded();

        let result = fx.store.import_books(vec![
            draft("Neuromancer", "William Gibson", "Fiction"),
            BookDraft {
                title: Some("No author".to_string()),
                category: Some("Fiction".to_string()),
                ..Default::default()
            },
        ]);

        assert!(result.unwrap_err().is_validation());
        assert_eq!(fx.store.len(), 3);
        assert!(fx.recorded().is_empty());
    }

    #[test]
    fn test_import_reassigns_colliding_ids() {
        let fx = fixture();
        seed(&fx.store);

        fx.store
            .import_books(vec![
                draft("Copy of Dune", "Frank Herbert", "Fiction").with_id(2),
                draft("Twin A", "X", "Y").with_id(500),
                draft("Twin B", "X", "Y").with_id(500),
            ])
            .unwrap();

        let books = fx.store.get_all();
        let ids: HashSet<_> = books.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), books.len());
        assert_eq!(fx.store.get_by_id(2).unwrap().title, "Dune");
        assert_eq!(fx.store.get_by_id(500).unwrap().title, "Twin A");
    }

    #[test]
    fn test_import_keeps_existing_timestamps() {
        let fx = fixture();

        fx.store
            .import_books(vec![draft("Old", "Author", "History")
                .with_id(7)
                .with_created_at(1_600_000_000_000)])
            .unwrap();

        assert_eq!(fx.store.get_by_id(7).unwrap().created_at, 1_600_000_000_000);
    }
}

#[cfg(test)]
mod storage_tests {
    use std::sync::Arc;

    use super::support::*;
    use crate::error::AppError;
    use crate::events::EventBus;
    use crate::repositories::{
        InMemoryKeyValueStorage, KeyValueStorage, MockKeyValueStorage, StorageBookRepository,
        DEFAULT_STORAGE_KEY,
    };
    use crate::services::BookStore;

    #[test]
    fn test_reopen_restores_collection() {
        let storage = Arc::new(InMemoryKeyValueStorage::new());
        let original = {
            let fx = fixture_with(storage.clone());
            seed(&fx.store)
        };

        let reopened = fixture_with(storage);
        assert_eq!(reopened.store.get_all(), original);
        assert!(reopened.recorded().is_empty());
    }

    #[test]
    fn test_corrupt_storage_loads_empty_and_reports() {
        let storage = Arc::new(InMemoryKeyValueStorage::new());
        storage.set_item(DEFAULT_STORAGE_KEY, "{{ definitely not json").unwrap();

        let fx = fixture_with(storage);
        assert!(fx.store.is_empty());
        assert_eq!(fx.recorded(), vec!["error:Could not load books from storage"]);
    }

    #[test]
    fn test_invalid_persisted_record_loads_empty() {
        let storage = Arc::new(InMemoryKeyValueStorage::new());
        storage
            .set_item(DEFAULT_STORAGE_KEY, r#"[{"id": 1, "title": "Only a title"}]"#)
            .unwrap();

        let fx = fixture_with(storage);
        assert!(fx.store.is_empty());
    }

    #[test]
    fn test_save_failure_keeps_memory_and_reports() {
        let mut mock = MockKeyValueStorage::new();
        mock.expect_get_item().returning(|_| Ok(None));
        mock.expect_set_item()
            .returning(|_, _| Err(AppError::Storage("quota exceeded".to_string())));

        let bus = Arc::new(EventBus::new());
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        record_events(&bus, &events);

        let repo = Arc::new(StorageBookRepository::new(Arc::new(mock)));
        let store = BookStore::open(repo, bus);

        let book = store.add(draft("Dune", "Frank Herbert", "Fiction")).unwrap();

        assert_eq!(store.get_by_id(book.id), Some(book));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "error:Could not save books to storage",
                "added:Dune",
                "changed:1",
            ]
        );
        assert!(!store.save_to_storage());
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::{BTreeSet, HashSet};

    use proptest::prelude::*;

    use super::support::*;

    proptest! {
        #[test]
        fn ids_stay_unique(
            explicit in proptest::collection::vec(proptest::option::of(1i64..20), 1..12),
            imported in proptest::collection::vec(1i64..20, 0..8),
        ) {
            let fx = fixture();

            for (n, id) in explicit.iter().enumerate() {
                let mut d = draft(&format!("Book {}", n), "Author", "Category");
                if let Some(id) = id {
                    d = d.with_id(*id);
                }
                // Duplicate explicit ids are rejected, the rest are accepted
                let _ = fx.store.add(d);
            }

            let batch = imported
                .iter()
                .enumerate()
                .map(|(n, id)| draft(&format!("Imported {}", n), "Author", "Category").with_id(*id))
                .collect();
            fx.store.import_books(batch).unwrap();

            let books = fx.store.get_all();
            let ids: HashSet<_> = books.iter().map(|b| b.id).collect();
            prop_assert_eq!(ids.len(), books.len());
        }

        #[test]
        fn categories_are_sorted_and_distinct(
            categories in proptest::collection::vec("[A-Za-z]{1,6}", 0..16),
        ) {
            let fx = fixture();
            for (n, category) in categories.iter().enumerate() {
                fx.store
                    .add(draft(&format!("Book {}", n), "Author", category))
                    .unwrap();
            }

            let listed = fx.store.get_categories();
            prop_assert!(listed.windows(2).all(|pair| pair[0] < pair[1]));

            let distinct: BTreeSet<String> = categories.into_iter().collect();
            let expected: Vec<String> = distinct.into_iter().collect();
            prop_assert_eq!(listed, expected);
        }

        #[test]
        fn search_results_are_a_subset_that_matches(query in "[a-zA-Z ]{0,6}") {
            let fx = fixture();
            seed(&fx.store);

            let results = fx.store.search(&query);
            prop_assert!(results.len() <= fx.store.len());

            if !query.trim().is_empty() {
                let term = query.to_lowercase();
                for book in &results {
                    prop_assert!(book.matches_term(&term));
                }
            }
        }
    }
}
