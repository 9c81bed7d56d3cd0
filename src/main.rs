// src/main.rs
//
// BookVerse command line front end

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use bookverse::application::{
    AppConfig, AppState, AssumeYes, BookForm, CatalogView, ConfirmationPort, FileTextSource,
    FormField, StdinConfirmation, TerminalView,
};
use bookverse::domain::{BookId, BookType};
use bookverse::events::{create_event_bus, BookAction, EventBus};
use bookverse::services::{sample_books, DemoLoader, DEFAULT_DEBOUNCE_MS};

type Terminal = TerminalView<Box<dyn Write + Send>>;

/// Local-first personal book catalog
#[derive(Parser)]
#[command(name = "bookverse", version)]
#[command(about = "Manage a personal book catalog from the terminal")]
struct Cli {
    /// Config file (defaults to <config_dir>/bookverse/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database file, overrides the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show books, optionally filtered
    List {
        /// Case-insensitive text search
        #[arg(short, long)]
        search: Option<String>,
        /// Exact category
        #[arg(short, long)]
        category: Option<String>,
        /// Print the visible books as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a book
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        author: String,
        /// Optional for typed books (comic, novel, textbook), which default it
        #[arg(short, long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        cover: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// comic, novel, textbook or general
        #[arg(long = "type", default_value = "general")]
        book_type: String,
    },
    /// Change fields of an existing book
    Update {
        id: BookId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        cover: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a book
    Delete {
        id: BookId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List distinct categories
    Categories,
    /// Show catalog statistics
    Stats,
    /// Write the catalog to bookverse-<timestamp>.json
    Export {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Append books from a JSON file
    Import { file: PathBuf },
    /// Delete every book
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Load the sample catalog
    SeedDemo {
        /// Fetch records from this URL instead (falls back to the sample)
        #[arg(long)]
        from_api: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    install_panic_hook();

    let cli = Cli::parse();
    let event_bus = Arc::new(create_event_bus());

    let config = load_config(&cli);
    let debounce_ms = config
        .as_ref()
        .map_or(DEFAULT_DEBOUNCE_MS, |c| c.search_debounce_ms);

    // Toasts move to stderr while stdout carries JSON
    let out: Box<dyn Write + Send> = match &cli.command {
        Commands::List { json: true, .. } => Box::new(io::stderr()),
        _ => Box::new(io::stdout()),
    };

    let mut view = TerminalView::new(out, Arc::clone(&event_bus), debounce_ms);
    if let Commands::Export { output } = &cli.command {
        view = view.with_export_dir(output);
    }
    let view = Arc::new(view);

    let result = match config {
        Ok(config) => run(cli.command, config, event_bus, Arc::clone(&view)).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("Command failed: {:?}", err);
            view.show_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("BOOKVERSE_LOG", "warn")).init();
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("Unrecoverable error: {}", info);
        default_hook(info);
    }));
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };

    let mut config = AppConfig::load_from(&path)
        .with_context(|| format!("Could not load config from {}", path.display()))?;

    if let Some(database) = &cli.database {
        config = config.with_database_path(database);
    }

    Ok(config)
}

fn confirmation(yes: bool) -> Box<dyn ConfirmationPort> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirmation)
    }
}

async fn run(
    command: Commands,
    config: AppConfig,
    event_bus: Arc<EventBus>,
    view: Arc<Terminal>,
) -> anyhow::Result<()> {
    let seed_demo_data = config.seed_demo_data;
    let demo_api_url = config.demo_api_url.clone();
    let state = AppState::bootstrap(config, Arc::clone(&event_bus), view.clone())
        .context("Could not open the catalog")?;

    match command {
        Commands::List {
            search,
            category,
            json,
        } => {
            state.controller.seed_demo_data_if_empty(seed_demo_data);
            state.controller.set_filters(
                search.as_deref().unwrap_or_default(),
                category.as_deref().unwrap_or_default(),
            );

            if json {
                let visible = state.controller.get_state().books;
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                state.controller.update_view();
            }
        }

        Commands::Add {
            title,
            author,
            category,
            cover,
            description,
            book_type,
        } => {
            state.modal.open_for_add();
            state.modal.set_book_type(BookType::parse(&book_type));
            state.modal.set_field(FormField::Title, title);
            state.modal.set_field(FormField::Author, author);
            state.modal.set_field(FormField::Category, category);
            state.modal.set_field(FormField::Cover, cover);
            state.modal.set_field(FormField::Description, description);
            submit_form(&state)?;
        }

        Commands::Update {
            id,
            title,
            author,
            category,
            cover,
            description,
        } => {
            state.controller.edit_book(id)?;

            let changes = [
                (FormField::Title, title),
                (FormField::Author, author),
                (FormField::Category, category),
                (FormField::Cover, cover),
                (FormField::Description, description),
            ];
            for (field, value) in changes {
                if let Some(value) = value {
                    state.modal.set_field(field, value);
                }
            }
            submit_form(&state)?;
        }

        Commands::Delete { id, yes } => {
            view.on_book_action(id, BookAction::Delete, confirmation(yes).as_ref());
        }

        Commands::Categories => {
            for category in state.store.get_categories() {
                println!("{}", category);
            }
        }

        Commands::Stats => {
            view.render_stats(&state.store.get_stats());
        }

        Commands::Export { .. } => {
            view.on_export_click();
        }

        Commands::Import { file } => {
            view.on_import_file(&FileTextSource::new(file)).await;
        }

        Commands::Clear { yes } => {
            state.controller.clear_all_books(confirmation(yes).as_ref());
        }

        Commands::SeedDemo { from_api } => {
            let drafts = match from_api.or(demo_api_url) {
                Some(url) => DemoLoader::new()?.load_from_api(&url).await,
                None => sample_books(),
            };
            if let Err(err) = state.store.import_books(drafts) {
                state.controller.show_app_error(err);
            }
        }
    }

    Ok(())
}

fn submit_form(state: &AppState) -> anyhow::Result<()> {
    if let Err(errors) = state.modal.submit() {
        bail!("Invalid book: {}", errors.join("; "));
    }
    Ok(())
}
