//! Task API error types.

/// Errors from calls against the Todoist API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or the connection failed.
    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded its timeout.
    #[error("{operation} request timed out")]
    Timeout { operation: &'static str },

    /// The API answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Name of the API operation that failed, if known.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Client(_) => None,
            Self::Request { operation, .. }
            | Self::Timeout { operation }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => Some(operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = ApiError::Timeout {
            operation: "update_task",
        };
        assert_eq!(err.to_string(), "update_task request timed out");
        assert_eq!(err.operation(), Some("update_task"));
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            operation: "move_task",
            status: 404,
            body: "Task not found".to_string(),
        };
        assert_eq!(err.to_string(), "move_task returned HTTP 404: Task not found");
    }
}
