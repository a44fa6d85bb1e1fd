//! Web service error types.

/// Errors that can occur while serving webhooks.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
