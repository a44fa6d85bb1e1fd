//! Webhook event handling.

use crate::todoist::{EventName, WebhookEvent};

use super::error::SorterError;
use super::learner::{learn, LearnOutcome};
use super::subject::TaskSubject;
use super::{Sorter, TaskOutcome};

/// Why a webhook event is not handled.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EventRejection {
    /// The event belongs to a project this service does not sort.
    #[error("Event for project {got} ignored, serving project {expected}")]
    ForeignProject { expected: String, got: String },

    /// The event kind does not affect placements.
    #[error("Unhandled event {0}")]
    UnknownEvent(String),
}

/// What handling a webhook event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// `item:added`: formatted, learned and possibly moved.
    Sorted(TaskOutcome),
    /// `item:updated` or `item:completed`: learned only.
    Learned(LearnOutcome),
}

impl Sorter {
    /// Decide whether an event is for this sorter.
    ///
    /// # Errors
    ///
    /// Returns the reason the event should be rejected.
    pub fn accept(&self, event: &WebhookEvent) -> Result<EventName, EventRejection> {
        if event.event_data.project_id != self.project_id() {
            return Err(EventRejection::ForeignProject {
                expected: self.project_id().to_string(),
                got: event.event_data.project_id.clone(),
            });
        }
        EventName::parse(&event.event_name)
            .ok_or_else(|| EventRejection::UnknownEvent(event.event_name.clone()))
    }

    /// Apply one webhook event inside a single transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for events [`Sorter::accept`] rejects, an API
    /// error if a Todoist call fails, or a store error.
    pub async fn handle_event(&self, event: WebhookEvent) -> Result<WebhookOutcome, SorterError> {
        let name = self
            .accept(&event)
            .map_err(|rejection| SorterError::InvalidInput(rejection.to_string()))?;

        let handle = self.store().begin_write().await?;
        let outcome = match name {
            EventName::ItemAdded => {
                WebhookOutcome::Sorted(self.sort_with(&handle, event.event_data.into()).await?)
            }
            EventName::ItemUpdated | EventName::ItemCompleted => {
                WebhookOutcome::Learned(learn(&handle, &TaskSubject::from(event.event_data)).await?)
            }
        };
        handle.commit().await?;
        Ok(outcome)
    }
}
