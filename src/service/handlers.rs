//! HTTP handlers for the webhook service.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::sorter::Sorter;
use crate::todoist::WebhookEvent;

/// Liveness text for `/`.
pub const RUNNING_MESSAGE: &str = "TodoistSorter service is running...";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Sorter used to vet incoming events and check the store.
    pub sorter: Sorter,
    /// Queue feeding the webhook worker.
    pub events: mpsc::Sender<WebhookEvent>,
}

impl AppState {
    #[must_use]
    pub fn new(sorter: Sorter, events: mpsc::Sender<WebhookEvent>) -> Self {
        Self { sorter, events }
    }
}

/// POST /todoist - Accept a Todoist webhook event.
pub async fn post_todoist(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed webhook payload");
            return StatusCode::UNPROCESSABLE_ENTITY;
        }
    };

    let name = match state.sorter.accept(&event) {
        Ok(name) => name,
        Err(rejection) => {
            tracing::info!(
                event = %event.event_name,
                task_id = %event.event_data.id,
                reason = %rejection,
                "Rejected webhook event"
            );
            return StatusCode::UNPROCESSABLE_ENTITY;
        }
    };

    tracing::info!(
        event = %name,
        task_id = %event.event_data.id,
        content = %event.event_data.content,
        "Received webhook event"
    );

    match state.events.try_send(event) {
        Ok(()) => StatusCode::OK,
        Err(TrySendError::Full(event)) => {
            tracing::warn!(
                event = %name,
                task_id = %event.event_data.id,
                "Webhook queue is full, refusing event"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(TrySendError::Closed(_)) => {
            tracing::error!("Webhook worker is gone, refusing event");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /healthz - Check that section memory is reachable.
pub async fn get_healthz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.sorter.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

/// GET or POST / - Liveness text.
pub async fn root() -> &'static str {
    RUNNING_MESSAGE
}
