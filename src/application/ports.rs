// src/application/ports.rs
//
// Outward-facing seams of the application layer
//
// - ConfirmationPort: asks the user before destructive actions
// - TextSource: where an import file's text comes from

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::AppResult;

/// Yes/no question before a destructive action
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmationPort: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers yes without asking (`--yes`)
pub struct AssumeYes;

impl ConfirmationPort for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        log::debug!("Auto-confirmed: {}", prompt);
        true
    }
}

/// Asks on stdin; anything but `y`/`yes` is a no
pub struct StdinConfirmation;

impl ConfirmationPort for StdinConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(err) => {
                log::warn!("Could not read confirmation: {}", err);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asynchronous text provider for imports
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    async fn read_text(&self) -> AppResult<String>;
}

pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TextSource for FileTextSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_text(&self) -> AppResult<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}
