// src/application/state.rs
//
// Composition root for one running catalog.
// Every shared component is built exactly once here and handed out as Arc.

use std::sync::Arc;

use crate::application::config::AppConfig;
use crate::application::controller::CatalogController;
use crate::application::modal::BookFormModal;
use crate::application::view::CatalogView;
use crate::db::{create_connection_pool, get_connection, get_database_path, initialize_database};
use crate::error::AppResult;
use crate::events::EventBus;
use crate::repositories::{
    BookRepository, InMemoryKeyValueStorage, KeyValueStorage, SqliteKeyValueStorage,
    StorageBookRepository,
};
use crate::services::BookStore;

/// Application state.
/// All fields are Arc-wrapped for thread-safe sharing.
pub struct AppState {
    pub config: AppConfig,
    pub event_bus: Arc<EventBus>,
    pub store: Arc<BookStore>,
    pub modal: Arc<BookFormModal>,
    pub controller: Arc<CatalogController>,
}

impl AppState {
    /// Open the SQLite-backed catalog described by `config`.
    ///
    /// The view is built by the caller on the same bus, since it needs the
    /// bus to publish user intents.
    pub fn bootstrap(
        config: AppConfig,
        event_bus: Arc<EventBus>,
        view: Arc<dyn CatalogView>,
    ) -> AppResult<Self> {
        // 1. INFRASTRUCTURE
        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => get_database_path()?,
        };
        log::info!("Opening catalog database at {}", db_path.display());

        let pool = Arc::new(create_connection_pool(&db_path)?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }

        let storage: Arc<dyn KeyValueStorage> = Arc::new(SqliteKeyValueStorage::new(pool));
        Ok(Self::assemble(config, storage, event_bus, view))
    }

    /// Volatile catalog, nothing touches the disk
    pub fn in_memory(
        config: AppConfig,
        event_bus: Arc<EventBus>,
        view: Arc<dyn CatalogView>,
    ) -> Self {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        Self::assemble(config, storage, event_bus, view)
    }

    fn assemble(
        config: AppConfig,
        storage: Arc<dyn KeyValueStorage>,
        event_bus: Arc<EventBus>,
        view: Arc<dyn CatalogView>,
    ) -> Self {
        // 2. REPOSITORY
        let repository: Arc<dyn BookRepository> = Arc::new(StorageBookRepository::with_key(
            storage,
            config.storage_key.clone(),
        ));

        // 3. STORE (loads persisted books)
        let store = Arc::new(BookStore::open(repository, Arc::clone(&event_bus)));

        // 4. PRESENTATION
        let modal = Arc::new(BookFormModal::new(Arc::clone(&event_bus)));
        let controller = Arc::new(CatalogController::new(
            Arc::clone(&store),
            view,
            modal.clone(),
            Arc::clone(&event_bus),
        ));

        // 5. EVENT HANDLER REGISTRATION (WIRING)
        controller.register_event_handlers();

        Self {
            config,
            event_bus,
            store,
            modal,
            controller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::view::TerminalView;
    use crate::domain::BookDraft;

    #[test]
    fn test_bootstrap_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_database_path(dir.path().join("catalog.db"));

        {
            let bus = Arc::new(EventBus::new());
            let view = Arc::new(TerminalView::new(Vec::new(), bus.clone(), 300));
            let state = AppState::bootstrap(config.clone(), bus, view).unwrap();
            state
                .store
                .add(BookDraft::new("Dune", "Frank Herbert", "Fiction"))
                .unwrap();
        }

        let bus = Arc::new(EventBus::new());
        let view = Arc::new(TerminalView::new(Vec::new(), bus.clone(), 300));
        let state = AppState::bootstrap(config, bus, view).unwrap();
        assert_eq!(state.store.len(), 1);
        assert_eq!(state.store.get_all()[0].title, "Dune");
    }

    #[test]
    fn test_in_memory_state_is_wired() {
        let bus = Arc::new(EventBus::new());
        let view = Arc::new(TerminalView::new(Vec::new(), bus.clone(), 300));
        let state = AppState::in_memory(AppConfig::default(), bus, view.clone());

        state.controller.load_initial_data(true);

        assert_eq!(state.store.len(), 3);
        assert!(view.contents().contains("Clean Code"));
        assert!(state.event_bus.subscriber_count::<crate::events::BooksChanged>() >= 1);
    }
}
