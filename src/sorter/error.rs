//! Sorter error types.

use crate::store::StoreError;
use crate::todoist::ApiError;

/// Errors from sorting a task or event.
#[derive(thiserror::Error, Debug)]
pub enum SorterError {
    /// The caller supplied ambiguous or mismatched identifying fields.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A Todoist call failed or timed out.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Section memory could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}
