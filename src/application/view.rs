// src/application/view.rs
//
// Catalog View
//
// ARCHITECTURE:
// - Pure render functions turn domain data into display text
// - CatalogView is the port the controller draws through
// - TerminalView draws on any writer and turns raw user input into
//   intent events on the bus
//
// RULES:
// - The view never calls the store
// - Everything the user does leaves the view as an event

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::application::ports::{ConfirmationPort, TextSource};
use crate::domain::{Book, BookId, CatalogStats};
use crate::error::AppResult;
use crate::events::{
    BookAction, BookSelected, BooksExportRequested, BooksImportRequested, EventBus,
    FilterChanged, ModalMode, ModalOpen,
};
use crate::services::SearchDebouncer;

/// Slice colors, cycled by position
pub const CHART_PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9",
];

/// Label of the "no category filter" option
pub const ALL_CATEGORIES_LABEL: &str = "All categories";

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this book?";

const CHART_BAR_WIDTH: usize = 20;

// ============================================================================
// PURE RENDERERS
// ============================================================================

/// One book as a text card
pub fn render_book_card(book: &Book) -> String {
    let mut card = format!(
        "[{}] {}\n    by {} | {}",
        book.id, book.title, book.author, book.category
    );
    if !book.description.is_empty() {
        card.push_str("\n    ");
        card.push_str(&book.description);
    }
    if !book.cover.is_empty() {
        card.push_str("\n    cover: ");
        card.push_str(&book.cover);
    }
    card
}

pub fn render_empty_state() -> &'static str {
    "No books yet\nAdd your first book to start managing your library!"
}

pub fn render_stats_summary(stats: &CatalogStats) -> String {
    format!(
        "Total books: {} | Categories: {} | Most popular: {}",
        stats.total_books, stats.total_categories, stats.popular_category
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: String,
    pub count: usize,
    /// Share of all books, rounded to one decimal
    pub percentage: f64,
    pub color: &'static str,
}

/// Category distribution, in category order
pub fn chart_data(stats: &CatalogStats) -> Vec<ChartSlice> {
    let total: usize = stats.category_count.values().sum();

    stats
        .category_count
        .iter()
        .enumerate()
        .map(|(index, (label, &count))| ChartSlice {
            label: label.clone(),
            count,
            percentage: if total > 0 {
                (count as f64 * 1000.0 / total as f64).round() / 10.0
            } else {
                0.0
            },
            color: CHART_PALETTE[index % CHART_PALETTE.len()],
        })
        .collect()
}

pub fn render_chart(slices: &[ChartSlice]) -> String {
    if slices.is_empty() {
        return "Category chart: shown once there is data".to_string();
    }

    let label_width = slices.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);

    slices
        .iter()
        .map(|slice| {
            let filled = ((slice.percentage / 100.0) * CHART_BAR_WIDTH as f64).round() as usize;
            format!(
                "{:<width$}  {}{}  {:>3}  {:>5.1}%",
                slice.label,
                "#".repeat(filled),
                ".".repeat(CHART_BAR_WIDTH.saturating_sub(filled)),
                slice.count,
                slice.percentage,
                width = label_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// (value, label) pairs for the category filter; the first is "all"
pub fn category_options(categories: &[String]) -> Vec<(String, String)> {
    std::iter::once((String::new(), ALL_CATEGORIES_LABEL.to_string()))
        .chain(categories.iter().map(|c| (c.clone(), c.clone())))
        .collect()
}

// ============================================================================
// VIEW PORT
// ============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait CatalogView: Send + Sync {
    fn render_books(&self, books: &[Book]);
    fn render_stats(&self, stats: &CatalogStats);
    fn update_category_filter(&self, categories: &[String]);
    fn show_success(&self, message: &str);
    fn show_error(&self, message: &str);
    fn clear_search(&self);
    fn clear_filter(&self);

    /// Hand an export document to the user under `filename`
    fn deliver_export(&self, filename: &str, contents: &str) -> AppResult<()>;
}

// ============================================================================
// TERMINAL VIEW
// ============================================================================

#[derive(Default)]
struct ViewInputs {
    search: String,
    category: String,
    categories: Vec<String>,
}

pub struct TerminalView<W: Write + Send> {
    out: Mutex<W>,
    event_bus: Arc<EventBus>,
    debouncer: SearchDebouncer,
    export_dir: PathBuf,
    inputs: Mutex<ViewInputs>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, event_bus: Arc<EventBus>, debounce_ms: u64) -> Self {
        Self {
            out: Mutex::new(out),
            debouncer: SearchDebouncer::new(Arc::clone(&event_bus), debounce_ms),
            event_bus,
            export_dir: PathBuf::from("."),
            inputs: Mutex::new(ViewInputs::default()),
        }
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn search_query(&self) -> String {
        self.inputs().search.clone()
    }

    pub fn filter_value(&self) -> String {
        self.inputs().category.clone()
    }

    /// Categories currently offered by the filter
    pub fn category_choices(&self) -> Vec<String> {
        self.inputs().categories.clone()
    }

    // ========================================================================
    // USER INPUT → INTENTS
    // ========================================================================

    /// Keystroke in the search box. The query is published once typing
    /// pauses. Must be called from within a tokio runtime.
    pub fn on_search_input(&self, text: &str) {
        self.inputs().search = text.to_string();
        self.debouncer.input(text);
    }

    pub fn on_filter_change(&self, category: &str) {
        self.inputs().category = category.to_string();
        self.event_bus.emit(FilterChanged::new(category));
    }

    pub fn on_add_click(&self) {
        self.event_bus.emit(ModalOpen::new(ModalMode::Add));
    }

    pub fn on_export_click(&self) {
        self.event_bus.emit(BooksExportRequested::new());
    }

    /// Read an import file and publish its raw text
    pub async fn on_import_file(&self, source: &dyn TextSource) {
        match source.read_text().await {
            Ok(text) => self.event_bus.emit(BooksImportRequested::new(text)),
            Err(err) => {
                log::error!("Could not read {}: {}", source.describe(), err);
                self.show_error("Could not read the JSON file");
            }
        }
    }

    /// Card action. Deleting asks for confirmation first.
    pub fn on_book_action(&self, book_id: BookId, action: BookAction, confirm: &dyn ConfirmationPort) {
        if action == BookAction::Delete && !confirm.confirm(DELETE_CONFIRMATION) {
            log::debug!("Delete of book {} cancelled", book_id);
            return;
        }
        self.event_bus.emit(BookSelected::new(book_id, action));
    }

    fn inputs(&self) -> std::sync::MutexGuard<'_, ViewInputs> {
        self.inputs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_block(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
            log::warn!("Could not write to the terminal: {}", err);
        }
    }
}

impl<W: Write + Send + AsRef<[u8]>> TerminalView<W> {
    /// Everything written so far (buffer-backed views)
    pub fn contents(&self) -> String {
        let out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(out.as_ref()).into_owned()
    }
}

impl<W: Write + Send> CatalogView for TerminalView<W> {
    fn render_books(&self, books: &[Book]) {
        if books.is_empty() {
            self.write_block(render_empty_state());
            return;
        }

        let cards: Vec<String> = books.iter().map(render_book_card).collect();
        self.write_block(&cards.join("\n"));
    }

    fn render_stats(&self, stats: &CatalogStats) {
        self.write_block(&render_stats_summary(stats));
        self.write_block(&render_chart(&chart_data(stats)));
    }

    fn update_category_filter(&self, categories: &[String]) {
        let selected = {
            let mut inputs = self.inputs();
            inputs.categories = categories.to_vec();
            // Keep the selection only while it is still offered
            if !categories.contains(&inputs.category) {
                inputs.category.clear();
            }
            inputs.category.clone()
        };

        let labels: Vec<String> = category_options(categories)
            .into_iter()
            .map(|(value, label)| {
                if value == selected {
                    format!("*{}", label)
                } else {
                    label
                }
            })
            .collect();
        self.write_block(&format!("Categories: {}", labels.join(", ")));
    }

    fn show_success(&self, message: &str) {
        self.write_block(&format!("[ok] {}", message));
    }

    fn show_error(&self, message: &str) {
        self.write_block(&format!("[error] {}", message));
    }

    fn clear_search(&self) {
        self.debouncer.cancel();
        self.inputs().search.clear();
    }

    fn clear_filter(&self) {
        self.inputs().category.clear();
    }

    fn deliver_export(&self, filename: &str, contents: &str) -> AppResult<()> {
        fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(filename);
        fs::write(&path, contents)?;
        log::info!("Exported catalog to {}", path.display());
        self.write_block(&format!("Saved {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockConfirmationPort;
    use crate::domain::BookDraft;

    fn book(id: BookId, title: &str, category: &str) -> Book {
        Book::new(BookDraft::new(title, "Author", category).with_id(id)).unwrap()
    }

    fn buffer_view() -> (Arc<EventBus>, TerminalView<Vec<u8>>) {
        let bus = Arc::new(EventBus::new());
        let view = TerminalView::new(Vec::new(), bus.clone(), 300);
        (bus, view)
    }

    #[test]
    fn test_card_includes_optional_fields_only_when_present() {
        let plain = book(1, "Dune", "Fiction");
        assert_eq!(render_book_card(&plain), "[1] Dune\n    by Author | Fiction");

        let described = Book::new(
            BookDraft::new("Dune", "Frank Herbert", "Fiction")
                .with_id(2)
                .with_description("Spice"),
        )
        .unwrap();
        assert!(render_book_card(&described).ends_with("\n    Spice"));
    }

    #[test]
    fn test_chart_data_uses_palette_in_order() {
        let stats = CatalogStats::from_books(&[
            book(1, "A", "Fiction"),
            book(2, "B", "Programming"),
            book(3, "C", "Programming"),
        ]);

        let slices = chart_data(&stats);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Fiction");
        assert_eq!(slices[0].color, "#FF6B6B");
        assert_eq!(slices[0].percentage, 33.3);
        assert_eq!(slices[1].color, "#4ECDC4");
        assert_eq!(slices[1].percentage, 66.7);
    }

    #[test]
    fn test_empty_chart_and_stats() {
        let stats = CatalogStats::default();
        assert!(chart_data(&stats).is_empty());
        assert_eq!(
            render_stats_summary(&stats),
            "Total books: 0 | Categories: 0 | Most popular: -"
        );
    }

    #[test]
    fn test_category_options_start_with_all() {
        let options = category_options(&["Fiction".to_string()]);
        assert_eq!(options[0], (String::new(), ALL_CATEGORIES_LABEL.to_string()));
        assert_eq!(options[1], ("Fiction".to_string(), "Fiction".to_string()));
    }

    #[test]
    fn test_terminal_view_renders_empty_state() {
        let (_, view) = buffer_view();
        view.render_books(&[]);
        assert!(view.contents().contains("No books yet"));
    }

    #[test]
    fn test_selection_survives_only_while_offered() {
        let (_, view) = buffer_view();
        view.on_filter_change("Fiction");

        view.update_category_filter(&["Fiction".to_string(), "History".to_string()]);
        assert_eq!(view.filter_value(), "Fiction");
        assert!(view.contents().contains("*Fiction"));

        view.update_category_filter(&["History".to_string()]);
        assert_eq!(view.filter_value(), "");
        assert_eq!(view.category_choices(), vec!["History"]);
    }

    #[test]
    fn test_filter_change_emits_intent() {
        let (bus, view) = buffer_view();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe::<FilterChanged, _>(move |e| sink.lock().unwrap().push(e.category.clone()));

        view.on_filter_change("History");
        view.on_filter_change("");

        assert_eq!(*seen.lock().unwrap(), vec!["History", ""]);
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let (bus, view) = buffer_view();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe::<BookSelected, _>(move |e| sink.lock().unwrap().push((e.book_id, e.action)));

        let mut refuse = MockConfirmationPort::new();
        refuse.expect_confirm().times(1).return_const(false);
        view.on_book_action(7, BookAction::Delete, &refuse);

        let mut accept = MockConfirmationPort::new();
        accept.expect_confirm().return_const(true);
        view.on_book_action(7, BookAction::Delete, &accept);

        // Edit never asks
        let mut never = MockConfirmationPort::new();
        never.expect_confirm().times(0);
        view.on_book_action(8, BookAction::Edit, &never);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(7, BookAction::Delete), (8, BookAction::Edit)]
        );
    }

    #[test]
    fn test_deliver_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let bus = Arc::new(EventBus::new());
        let view = TerminalView::new(Vec::new(), bus, 300).with_export_dir(dir.path());

        view.deliver_export("bookverse-1.json", "[]").unwrap();

        let written = fs::read_to_string(dir.path().join("bookverse-1.json")).unwrap();
        assert_eq!(written, "[]");
        assert!(view.contents().contains("Saved"));
    }

    #[tokio::test]
    async fn test_unreadable_import_shows_error() {
        let (bus, view) = buffer_view();
        let seen = Arc::new(Mutex::new(0));
        let sink = seen.clone();
        bus.subscribe::<BooksImportRequested, _>(move |_| *sink.lock().unwrap() += 1);

        let source = crate::application::ports::FileTextSource::new("/definitely/missing.json");
        view.on_import_file(&source).await;

        assert_eq!(*seen.lock().unwrap(), 0);
        assert!(view.contents().contains("[error] Could not read the JSON file"));
    }
}
