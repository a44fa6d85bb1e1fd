//! Learning section placements from observed tasks.

use chrono::Utc;

use crate::store::MemoryHandle;

use super::error::SorterError;
use super::subject::TaskSubject;

/// What learning from one observation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LearnOutcome {
    /// The task has no section; nothing to learn.
    Unsectioned,
    /// Memory already had this section.
    Unchanged,
    /// First placement seen for the title.
    Inserted,
    /// The title moved from `previous` to a new section.
    Updated { previous: String },
}

impl LearnOutcome {
    /// Whether memory was written.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated { .. })
    }
}

/// Bring memory in line with one observed placement.
///
/// Writes at most once, and only when the subject sits in a section that
/// differs from the remembered one.
///
/// # Errors
///
/// Returns `SorterError::InvalidInput` when the subject belongs to another
/// project, or a store error if memory cannot be read or written.
pub async fn learn(handle: &MemoryHandle, subject: &TaskSubject) -> Result<LearnOutcome, SorterError> {
    if subject.project_id() != handle.project_id() {
        return Err(SorterError::InvalidInput(format!(
            "task {} belongs to project {}, memory is for project {}",
            subject.task_id(),
            subject.project_id(),
            handle.project_id()
        )));
    }

    let Some(section) = subject.section_id() else {
        return Ok(LearnOutcome::Unsectioned);
    };

    let historic = handle.lookup(subject.title()).await?;
    if historic.as_deref() == Some(section) {
        tracing::trace!(task_id = subject.task_id(), section_id = section, "Placement already known");
        return Ok(LearnOutcome::Unchanged);
    }

    let upsert = handle.upsert(subject.title(), section, Utc::now()).await?;
    tracing::debug!(
        task_id = subject.task_id(),
        title = subject.title(),
        section_id = section,
        previous = ?historic,
        ?upsert,
        "Learned placement"
    );

    Ok(match historic {
        Some(previous) => LearnOutcome::Updated { previous },
        None => LearnOutcome::Inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::todoist::Task;
    use tempfile::TempDir;

    fn subject(title: &str, section: Option<&str>) -> TaskSubject {
        TaskSubject::Task(Task {
            id: "1".to_string(),
            project_id: "P".to_string(),
            content: title.to_string(),
            section_id: section.map(String::from),
        })
    }

    async fn learn_once(store: &MemoryStore, subject: &TaskSubject) -> LearnOutcome {
        let handle = store.begin_write().await.unwrap();
        let outcome = learn(&handle, subject).await.unwrap();
        handle.commit().await.unwrap();
        outcome
    }

    #[tokio::test]
    async fn test_learning_twice_writes_once() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("t.db"), "P").await.unwrap();

        let first = learn_once(&store, &subject("eggs", Some("5"))).await;
        let records_after_first = store.records().await.unwrap();
        let second = learn_once(&store, &subject("eggs", Some("5"))).await;

        assert_eq!(first, LearnOutcome::Inserted);
        assert_eq!(second, LearnOutcome::Unchanged);
        assert!(!second.is_write());
        assert_eq!(store.records().await.unwrap(), records_after_first);
    }

    #[tokio::test]
    async fn test_section_sequence_counts_transitions() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("t.db"), "P").await.unwrap();

        let mut outcomes = Vec::new();
        for section in ["3", "7", "3"] {
            outcomes.push(learn_once(&store, &subject("flour", Some(section))).await);
        }

        assert_eq!(
            outcomes,
            vec![
                LearnOutcome::Inserted,
                LearnOutcome::Updated {
                    previous: "3".to_string()
                },
                LearnOutcome::Updated {
                    previous: "7".to_string()
                },
            ]
        );
        assert_eq!(outcomes.iter().filter(|o| o.is_write()).count(), 3);
        assert_eq!(store.lookup("flour").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn test_unsectioned_never_writes() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("t.db"), "P").await.unwrap();

        let outcome = learn_once(&store, &subject("X", None)).await;
        assert_eq!(outcome, LearnOutcome::Unsectioned);
        assert!(store.records().await.unwrap().is_empty());

        learn_once(&store, &subject("X", Some("2"))).await;
        learn_once(&store, &subject("x", None)).await;
        assert_eq!(store.lookup("X").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_title_case_does_not_split_records() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("t.db"), "P").await.unwrap();

        learn_once(&store, &subject("Buy Milk", Some("4"))).await;
        let outcome = learn_once(&store, &subject("buy milk", Some("4"))).await;

        assert_eq!(outcome, LearnOutcome::Unchanged);
        assert_eq!(store.records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_project_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("t.db"), "Other").await.unwrap();
        let handle = store.begin().await.unwrap();

        let result = learn(&handle, &subject("eggs", Some("5"))).await;

        assert!(matches!(result, Err(SorterError::InvalidInput(_))));
    }
}
