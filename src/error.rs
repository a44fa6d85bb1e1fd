//! Top-level error type for the binary and library entry points.

use crate::config::ConfigError;
use crate::service::ServiceError;
use crate::sorter::SorterError;
use crate::store::StoreError;
use crate::todoist::ApiError;

/// Any failure that ends a command.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sorter(#[from] SorterError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err: Error = ConfigError::Missing("APITOKEN").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Required environment variable APITOKEN is not set"
        );
    }
}
