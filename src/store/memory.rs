//! Section memory with async `SQLite` operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::StoreError;
use super::schema::{create_table_sql, table_name, PRAGMAS};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Fold a task title into its lookup key.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title.to_lowercase()
}

/// One remembered placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecord {
    pub project_id: String,
    pub normalized_content: String,
    pub section_id: String,
    pub last_updated: String,
}

/// What an upsert did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// No record matched; a new one was written.
    Inserted,
    /// This many existing records were rewritten.
    Updated(usize),
}

/// Durable mapping from (project, normalized title) to last-known section.
///
/// Each handle opens its own connection, so webhook handling and a
/// reconciliation pass can hold handles at the same time. Write handles of
/// one store (and its clones) are serialized in-process; `SQLite`'s busy
/// timeout only has to cover other processes.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
    project_id: String,
    table: String,
    write_gate: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// Open the memory for a project, creating the database and table if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the project id cannot name a table, the parent
    /// directory cannot be created, or the database cannot be opened.
    pub async fn open(
        path: impl AsRef<Path>,
        project_id: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let project_id = project_id.into();
        let table = table_name(&project_id)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StoreError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        let store = Self {
            path,
            project_id,
            table,
            write_gate: Arc::new(Mutex::new(())),
        };
        store.begin_write().await?.commit().await?;
        tracing::debug!(path = %store.path.display(), table = %store.table, "Memory store ready");
        Ok(store)
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project this memory belongs to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Name of the backing table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Open a read handle with its own connection and a deferred transaction.
    ///
    /// The table is created if missing. Dropping the handle without calling
    /// [`MemoryHandle::commit`] rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or prepared.
    pub async fn begin(&self) -> Result<MemoryHandle, StoreError> {
        self.open_handle("BEGIN DEFERRED", None).await
    }

    /// Open a handle that holds the write lock until it is committed or dropped.
    ///
    /// Waits for any other write handle of this store to finish first.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the write lock
    /// cannot be taken within the busy timeout.
    pub async fn begin_write(&self) -> Result<MemoryHandle, StoreError> {
        let guard = self.write_gate.clone().lock_owned().await;
        self.open_handle("BEGIN IMMEDIATE", Some(guard)).await
    }

    async fn open_handle(
        &self,
        begin: &'static str,
        write_guard: Option<OwnedMutexGuard<()>>,
    ) -> Result<MemoryHandle, StoreError> {
        let path = self.path.clone();
        let create = create_table_sql(&self.table);

        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let conn = Connection::open(&path).map_err(|source| StoreError::DatabaseOpen {
                path: path.clone(),
                source,
            })?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch(PRAGMAS)?;
            conn.execute_batch(&create)?;
            conn.execute_batch(begin)?;
            Ok(conn)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)??;

        Ok(MemoryHandle {
            conn: Arc::new(Mutex::new(conn)),
            project_id: self.project_id.clone(),
            table: self.table.clone(),
            _write_guard: write_guard,
        })
    }

    /// Look up a title in its own short transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn lookup(&self, title: &str) -> Result<Option<String>, StoreError> {
        let handle = self.begin().await?;
        let section = handle.lookup(title).await?;
        handle.commit().await?;
        Ok(section)
    }

    /// Upsert a placement in its own short transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be written.
    pub async fn upsert(
        &self,
        title: &str,
        section_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Upsert, StoreError> {
        let handle = self.begin_write().await?;
        let outcome = handle.upsert(title, section_id, at).await?;
        handle.commit().await?;
        Ok(outcome)
    }

    /// List every record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn records(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        let handle = self.begin().await?;
        let records = handle.records().await?;
        handle.commit().await?;
        Ok(records)
    }

    /// Check that the database opens and the table is readable.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error on failure.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let handle = self.begin().await?;
        let table = self.table.clone();
        handle
            .run(move |conn| {
                conn.query_row(&format!(r#"SELECT COUNT(*) FROM "{table}""#), [], |row| {
                    row.get::<_, i64>(0)
                })?;
                Ok(())
            })
            .await?;
        handle.commit().await
    }
}

/// An open connection with an uncommitted transaction.
///
/// Lets many lookups and upserts share a single commit.
#[derive(Debug)]
pub struct MemoryHandle {
    conn: Arc<Mutex<Connection>>,
    project_id: String,
    table: String,
    _write_guard: Option<OwnedMutexGuard<()>>,
}

impl MemoryHandle {
    /// Project this handle writes to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|_| StoreError::TaskCancelled)?
    }

    /// Return the remembered section for a title, if any.
    ///
    /// The title is case-folded first. When duplicate rows exist the oldest
    /// one wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn lookup(&self, title: &str) -> Result<Option<String>, StoreError> {
        let sql = format!(
            r#"SELECT item_section FROM "{}"
               WHERE item_project = ?1 AND item_content = ?2
               ORDER BY rowid LIMIT 1"#,
            self.table
        );
        let project = self.project_id.clone();
        let key = normalize_title(title);

        self.run(move |conn| {
            let section = conn
                .query_row(&sql, params![project, key], |row| row.get(0))
                .optional()?;
            Ok(section)
        })
        .await
    }

    /// Record `section_id` for a title.
    ///
    /// Rewrites every matching row when one exists, otherwise inserts.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails.
    pub async fn upsert(
        &self,
        title: &str,
        section_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Upsert, StoreError> {
        let update_sql = format!(
            r#"UPDATE "{}" SET item_section = ?1, last_updated = ?2
               WHERE item_project = ?3 AND item_content = ?4"#,
            self.table
        );
        let insert_sql = format!(
            r#"INSERT INTO "{}" (item_project, item_content, item_section, last_updated)
               VALUES (?1, ?2, ?3, ?4)"#,
            self.table
        );
        let project = self.project_id.clone();
        let key = normalize_title(title);
        let section = section_id.to_string();
        let timestamp = at.to_rfc3339();

        self.run(move |conn| {
            let updated = conn.execute(&update_sql, params![section, timestamp, project, key])?;
            if updated > 0 {
                return Ok(Upsert::Updated(updated));
            }
            conn.execute(&insert_sql, params![project, key, section, timestamp])?;
            Ok(Upsert::Inserted)
        })
        .await
    }

    /// List every record visible to this transaction in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn records(&self) -> Result<Vec<MemoryRecord>, StoreError> {
        let sql = format!(
            r#"SELECT item_project, item_content, item_section, last_updated
               FROM "{}" ORDER BY rowid"#,
            self.table
        );

        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map([], |row| {
                    Ok(MemoryRecord {
                        project_id: row.get(0)?,
                        normalized_content: row.get(1)?,
                        section_id: row.get(2)?,
                        last_updated: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    /// Commit the transaction and close the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; the transaction is then rolled
    /// back when the connection closes.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.run(|conn| {
            conn.execute_batch("COMMIT")?;
            Ok(())
        })
        .await
    }
}
