//! Leading-capital convention for task titles.

use crate::todoist::{ApiError, TaskApi};

/// Return the title with its first character upper-cased, if that changes it.
///
/// Only the first character is touched. Empty titles and titles starting
/// with an uppercase or caseless character yield `None`.
#[must_use]
pub fn capitalize_first(content: &str) -> Option<String> {
    let mut chars = content.chars();
    let first = chars.next()?;
    if first.is_uppercase() {
        return None;
    }

    let upper: String = first.to_uppercase().collect();
    if upper.chars().eq(std::iter::once(first)) {
        return None;
    }
    Some(upper + chars.as_str())
}

/// Correct a task's title remotely when it does not start with a capital.
///
/// Returns the title the task now has. No call is made when the title is
/// already in shape.
///
/// # Errors
///
/// Returns the API error if the update call fails.
pub async fn normalize(api: &dyn TaskApi, task_id: &str, content: &str) -> Result<String, ApiError> {
    let Some(corrected) = capitalize_first(content) else {
        return Ok(content.to_string());
    };

    api.update_task(task_id, &corrected).await?;
    tracing::info!(task_id, from = content, to = %corrected, "Capitalized task title");
    Ok(corrected)
}
