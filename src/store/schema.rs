//! Per-project table layout for section memory.

use super::error::StoreError;

/// Prefix of every per-project memory table.
pub const TABLE_PREFIX: &str = "Sections_";

/// Connection-level settings applied each time a connection is opened.
pub const PRAGMAS: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
";

/// Derive the memory table name for a project.
///
/// Only ASCII alphanumerics, `_` and `-` are accepted, since the name is
/// spliced into SQL text.
///
/// # Errors
///
/// Returns `StoreError::InvalidProject` for empty or unsafe identifiers.
pub fn table_name(project_id: &str) -> Result<String, StoreError> {
    let valid = !project_id.is_empty()
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(StoreError::InvalidProject(project_id.to_string()));
    }
    Ok(format!("{TABLE_PREFIX}{project_id}"))
}

/// SQL that lazily creates a project's memory table.
#[must_use]
pub fn create_table_sql(table: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS "{table}" (
    item_project TEXT NOT NULL,
    item_content TEXT NOT NULL,
    item_section TEXT NOT NULL,
    last_updated TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS "idx_{table}_content" ON "{table}"(item_project, item_content);"#
    )
}
