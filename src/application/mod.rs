// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - This layer sits ABOVE the store and the event bus
// - It provides the boundary between the user (terminal) and the catalog
// - Controller, view and form talk to each other only through events
// - AppState is the single place where components are wired

pub mod config;
pub mod controller;
pub mod error_handling;
pub mod modal;
pub mod ports;
pub mod state;
pub mod view;


pub use config::AppConfig;
pub use controller::{export_filename, CatalogController, ControllerState};
pub use error_handling::{ErrorResponse, ErrorType};
pub use modal::{classify_cover_url, BookForm, BookFormModal, CoverPreview, FormField, FormFields};
pub use ports::{AssumeYes, ConfirmationPort, FileTextSource, StdinConfirmation, TextSource};
pub use state::AppState;
pub use view::{
    category_options, chart_data, render_book_card, render_chart, render_empty_state,
    render_stats_summary, CatalogView, ChartSlice, TerminalView,
};
