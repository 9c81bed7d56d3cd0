// src/services/demo_loader.rs
//
// Demo Loader - sample records for an empty catalog
//
// CRITICAL RULES:
// - Returns raw drafts, never touches the store
// - A failed fetch is logged and replaced by the built-in sample

use std::time::Duration;

use reqwest::{header, Client};

use crate::domain::BookDraft;
use crate::error::{AppError, AppResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Built-in sample catalog
pub fn sample_books() -> Vec<BookDraft> {
    vec![
        BookDraft::new("JavaScript: The Good Parts", "Douglas Crockford", "Programming")
            .with_id(1)
            .with_description("A comprehensive guide to JavaScript programming")
            .with_cover("https://images-na.ssl-images-amazon.com/images/I/81kqrwS1nNL.jpg"),
        BookDraft::new("Clean Code", "Robert C. Martin", "Programming")
            .with_id(2)
            .with_description("A Handbook of Agile Software Craftsmanship")
            .with_cover("https://images-na.ssl-images-amazon.com/images/I/515iEcDr1GL.jpg"),
        BookDraft::new("Design Patterns", "Gang of Four", "Programming")
            .with_id(3)
            .with_description("Elements of Reusable Object-Oriented Software")
            .with_cover("https://images-na.ssl-images-amazon.com/images/I/51szD9HC9pL.jpg"),
    ]
}

pub struct DemoLoader {
    http_client: Client,
}

impl DemoLoader {
    pub fn new() -> AppResult<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http_client })
    }

    /// Fetch records from `url`, falling back to `sample_books()` on any failure
    pub async fn load_from_api(&self, url: &str) -> Vec<BookDraft> {
        match self.fetch(url).await {
            Ok(drafts) => {
                log::info!("Loaded {} demo records from {}", drafts.len(), url);
                drafts
            }
            Err(err) => {
                log::error!("Failed to load demo data from {}: {}", url, err);
                sample_books()
            }
        }
    }

    async fn fetch(&self, url: &str) -> AppResult<Vec<BookDraft>> {
        let url = url::Url::parse(url)?;

        let response = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Other(format!(
                "Demo API returned status: {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        crate::repositories::parse_book_records(&text)
    }
}
