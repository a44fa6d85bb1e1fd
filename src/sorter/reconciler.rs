//! Full passes over a project's tasks.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::store::MemoryHandle;

use super::error::SorterError;
use super::learner::{learn, LearnOutcome};
use super::resolver::resolve;
use super::subject::TaskSubject;
use super::{formatter, Sorter, TaskOutcome};

/// Tally of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub seen: usize,
    pub renamed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub moved: usize,
    pub failed: usize,
}

impl ReconcileReport {
    fn record(&mut self, outcome: &TaskOutcome) {
        if outcome.renamed_to.is_some() {
            self.renamed += 1;
        }
        match &outcome.learned {
            LearnOutcome::Inserted => self.inserted += 1,
            learned if learned.is_write() => self.updated += 1,
            _ => {}
        }
        if outcome.moved_to.is_some() {
            self.moved += 1;
        }
    }
}

impl Sorter {
    /// Format, learn and, for unsectioned tasks, resolve one subject.
    pub(crate) async fn sort_with(
        &self,
        handle: &MemoryHandle,
        subject: TaskSubject,
    ) -> Result<TaskOutcome, SorterError> {
        let title = formatter::normalize(self.api(), subject.task_id(), subject.title()).await?;
        let renamed_to = (title != subject.title()).then(|| title.clone());
        let subject = subject.with_title(title);

        let learned = learn(handle, &subject).await?;
        let moved_to = if subject.section_id().is_none() {
            resolve(self.api(), handle, subject.task_id(), subject.title()).await?
        } else {
            None
        };

        Ok(TaskOutcome {
            renamed_to,
            learned,
            moved_to,
        })
    }

    /// Fetch one task by id and sort it.
    ///
    /// # Errors
    ///
    /// Returns an API error if the task cannot be fetched or corrected, a
    /// store error if memory fails, or `InvalidInput` for a task of another
    /// project.
    pub async fn sort_task(&self, task_id: &str) -> Result<TaskOutcome, SorterError> {
        let task = self.api().get_task(task_id).await?;
        let handle = self.store().begin_write().await?;
        let outcome = self.sort_with(&handle, task.into()).await?;
        handle.commit().await?;
        Ok(outcome)
    }

    /// Walk every task in the project once.
    ///
    /// The task list is fetched before the write lock is taken. Tasks are
    /// handled in the order the API returns them, all inside one
    /// transaction that is committed at the end. API failures and invalid
    /// tasks are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an API error if the task list cannot be fetched, or a store
    /// error, which abandons the pass and rolls it back.
    pub async fn reconcile(&self) -> Result<ReconcileReport, SorterError> {
        let tasks = self.api().get_tasks(self.project_id()).await?;
        tracing::debug!(project_id = self.project_id(), count = tasks.len(), "Reconciling tasks");

        let handle = self.store().begin_write().await?;

        let mut report = ReconcileReport::default();
        for task in tasks {
            report.seen += 1;
            let task_id = task.id.clone();
            match self.sort_with(&handle, task.into()).await {
                Ok(outcome) => report.record(&outcome),
                Err(SorterError::Store(e)) => {
                    tracing::error!(task_id = %task_id, error = %e, "Memory failed, abandoning pass");
                    return Err(e.into());
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(task_id = %task_id, error = %e, "Skipping task");
                }
            }
        }

        handle.commit().await?;
        tracing::info!(
            project_id = self.project_id(),
            seen = report.seen,
            renamed = report.renamed,
            inserted = report.inserted,
            updated = report.updated,
            moved = report.moved,
            failed = report.failed,
            "Reconciliation pass complete"
        );
        Ok(report)
    }
}

/// Reconcile now, then again `interval` after each pass finishes.
///
/// Passes never overlap. Returns once `cancel` fires; a pass in flight is
/// dropped and its transaction rolled back.
pub async fn run_periodic(sorter: Sorter, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Starting periodic reconciliation");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = sorter.reconcile() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Reconciliation pass failed");
                }
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }
    tracing::info!("Periodic reconciliation stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_records_outcomes() {
        let mut report = ReconcileReport::default();
        report.record(&TaskOutcome {
            renamed_to: Some("Eggs".to_string()),
            learned: LearnOutcome::Inserted,
            moved_to: None,
        });
        report.record(&TaskOutcome {
            renamed_to: None,
            learned: LearnOutcome::Unsectioned,
            moved_to: Some("5".to_string()),
        });
        report.record(&TaskOutcome {
            renamed_to: None,
            learned: LearnOutcome::Unchanged,
            moved_to: None,
        });
        report.record(&TaskOutcome {
            renamed_to: None,
            learned: LearnOutcome::Updated {
                previous: "1".to_string(),
            },
            moved_to: None,
        });

        assert_eq!(report.renamed, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.moved, 1);
        assert_eq!(report.failed, 0);
    }
}
