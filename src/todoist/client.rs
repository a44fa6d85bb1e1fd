//! Todoist REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{Task, TaskPage};

/// Default Todoist API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.todoist.com/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest page size the tasks endpoint accepts.
const PAGE_LIMIT: u32 = 200;

/// Operations the sorter needs from the task service.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetch every task in a project, following pagination to the end.
    async fn get_tasks(&self, project_id: &str) -> Result<Vec<Task>, ApiError>;

    /// Fetch one task.
    async fn get_task(&self, task_id: &str) -> Result<Task, ApiError>;

    /// Replace a task's title.
    async fn update_task(&self, task_id: &str, content: &str) -> Result<(), ApiError>;

    /// Move a task into a section.
    async fn move_task(&self, task_id: &str, section_id: &str) -> Result<(), ApiError>;
}

/// Bearer-token client for the Todoist REST API.
#[derive(Debug, Clone)]
pub struct TodoistClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TodoistClient {
    /// Create a client against `base_url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Client` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    ApiError::Timeout { operation }
                } else {
                    ApiError::Request { operation, source }
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, ApiError> {
        response.json().await.map_err(|source| {
            if source.is_timeout() {
                ApiError::Timeout { operation }
            } else {
                ApiError::Decode { operation, source }
            }
        })
    }
}

#[async_trait]
impl TaskApi for TodoistClient {
    async fn get_tasks(&self, project_id: &str) -> Result<Vec<Task>, ApiError> {
        const OPERATION: &str = "get_tasks";

        let mut tasks = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut request = self
                .client
                .get(self.url("tasks"))
                .query(&[("project_id", project_id)])
                .query(&[("limit", PAGE_LIMIT)]);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }

            let response = self.send(OPERATION, request).await?;
            let page: TaskPage = Self::decode(OPERATION, response).await?;
            tracing::trace!(
                project_id,
                count = page.results.len(),
                more = page.next_cursor.is_some(),
                "Fetched task page"
            );
            tasks.extend(page.results);

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(tasks)
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        const OPERATION: &str = "get_task";

        let request = self.client.get(self.url(&format!("tasks/{task_id}")));
        let response = self.send(OPERATION, request).await?;
        Self::decode(OPERATION, response).await
    }

    async fn update_task(&self, task_id: &str, content: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url(&format!("tasks/{task_id}")))
            .json(&serde_json::json!({ "content": content }));
        self.send("update_task", request).await?;
        Ok(())
    }

    async fn move_task(&self, task_id: &str, section_id: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url(&format!("tasks/{task_id}/move")))
            .json(&serde_json::json!({ "section_id": section_id }));
        self.send("move_task", request).await?;
        Ok(())
    }
}
