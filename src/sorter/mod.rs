//! Learning task placements and filing tasks into their remembered section.

mod error;
mod events;
mod formatter;
mod learner;
mod reconciler;
mod resolver;
mod subject;

use std::sync::Arc;

use crate::store::{MemoryHandle, MemoryStore};
use crate::todoist::TaskApi;

pub use error::SorterError;
pub use events::{EventRejection, WebhookOutcome};
pub use formatter::{capitalize_first, normalize};
pub use learner::{learn, LearnOutcome};
pub use reconciler::{run_periodic, ReconcileReport};
pub use resolver::resolve;
pub use subject::TaskSubject;

/// Result of running one task through formatter, learner and resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// Corrected title, when the formatter changed it.
    pub renamed_to: Option<String>,
    /// What the learner did.
    pub learned: LearnOutcome,
    /// Section the resolver moved the task to.
    pub moved_to: Option<String>,
}

/// Service context tying the task API to one project's memory.
#[derive(Clone)]
pub struct Sorter {
    api: Arc<dyn TaskApi>,
    store: MemoryStore,
}

impl Sorter {
    /// Create a sorter for the project the store belongs to.
    #[must_use]
    pub fn new(api: Arc<dyn TaskApi>, store: MemoryStore) -> Self {
        Self { api, store }
    }

    /// Project being sorted.
    #[must_use]
    pub fn project_id(&self) -> &str {
        self.store.project_id()
    }

    /// Section memory.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Task API client.
    #[must_use]
    pub fn api(&self) -> &dyn TaskApi {
        self.api.as_ref()
    }

    /// Capitalize a task title remotely when needed.
    ///
    /// # Errors
    ///
    /// Returns `SorterError::Api` if the update call fails.
    pub async fn normalize(&self, task_id: &str, content: &str) -> Result<String, SorterError> {
        Ok(normalize(self.api(), task_id, content).await?)
    }

    /// Learn from one observation, inside `handle` or in a transaction of its own.
    ///
    /// # Errors
    ///
    /// See [`learn`].
    pub async fn learn(
        &self,
        subject: &TaskSubject,
        handle: Option<&MemoryHandle>,
    ) -> Result<LearnOutcome, SorterError> {
        if let Some(handle) = handle {
            return learn(handle, subject).await;
        }

        let handle = self.store.begin_write().await?;
        let outcome = learn(&handle, subject).await?;
        handle.commit().await?;
        Ok(outcome)
    }

    /// Move an unsectioned task to its remembered section, if any.
    ///
    /// # Errors
    ///
    /// See [`resolve`].
    pub async fn resolve(
        &self,
        task_id: &str,
        title: &str,
        handle: Option<&MemoryHandle>,
    ) -> Result<Option<String>, SorterError> {
        if let Some(handle) = handle {
            return resolve(self.api(), handle, task_id, title).await;
        }

        let handle = self.store.begin().await?;
        let section = resolve(self.api(), &handle, task_id, title).await?;
        handle.commit().await?;
        Ok(section)
    }
}
