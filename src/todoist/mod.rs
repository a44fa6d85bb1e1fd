//! Todoist REST client and payload types.

mod client;
mod error;
mod types;

pub use client::{TaskApi, TodoistClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use types::{EventData, EventName, Task, TaskPage, WebhookEvent};
