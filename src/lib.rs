//! Todoist Sorter - learns which section each task belongs to and files new tasks there.

pub mod config;
pub mod error;
pub mod service;
pub mod sorter;
pub mod store;
pub mod todoist;

use std::sync::Arc;

pub use error::Error;

use config::SorterConfig;
use sorter::Sorter;
use store::MemoryStore;
use todoist::TodoistClient;

/// Build the sorter described by `config`: API client plus opened memory store.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the store cannot
/// be opened.
pub async fn build_sorter(config: &SorterConfig) -> Result<Sorter, Error> {
    let client = TodoistClient::new(&config.api_url, &config.api_token, config.api_timeout)?;
    let store = MemoryStore::open(&config.db_path, &config.project_id).await?;
    Ok(Sorter::new(Arc::new(client), store))
}
