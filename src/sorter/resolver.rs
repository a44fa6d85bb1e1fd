//! Filing unsectioned tasks into their remembered section.

use crate::store::MemoryHandle;
use crate::todoist::TaskApi;

use super::error::SorterError;

/// Move a task into the section remembered for its title.
///
/// Callers only pass tasks that currently have no section. Returns the
/// section the task was moved to, or `None` when nothing is remembered.
///
/// # Errors
///
/// Returns a store error if memory cannot be read, or an API error if the
/// move fails.
pub async fn resolve(
    api: &dyn TaskApi,
    handle: &MemoryHandle,
    task_id: &str,
    title: &str,
) -> Result<Option<String>, SorterError> {
    let Some(section) = handle.lookup(title).await? else {
        tracing::debug!(task_id, title, "No remembered section");
        return Ok(None);
    };

    api.move_task(task_id, &section).await?;
    tracing::info!(task_id, title, section_id = %section, "Moved task to remembered section");
    Ok(Some(section))
}
