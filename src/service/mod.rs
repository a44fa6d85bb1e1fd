//! Webhook HTTP service.

mod error;
mod handlers;
mod server;
mod worker;

pub use error::ServiceError;
pub use handlers::{AppState, RUNNING_MESSAGE};
pub use server::{build_router, serve, ServerConfig, WebhookServer, DEFAULT_HOST, DEFAULT_PORT};
pub use worker::{spawn_webhook_worker, DEFAULT_QUEUE_CAPACITY};
