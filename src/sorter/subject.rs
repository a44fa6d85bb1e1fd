//! A task observed either through the API or through a webhook.

use crate::todoist::{EventData, Task};

use super::error::SorterError;

/// The thing being sorted, whatever its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSubject {
    /// Fetched from the task API.
    Task(Task),
    /// Delivered in a webhook payload.
    Event(EventData),
}

impl TaskSubject {
    /// Build a subject from exactly one of a task or an event.
    ///
    /// # Errors
    ///
    /// Returns `SorterError::InvalidInput` when neither or both are given.
    pub fn from_parts(task: Option<Task>, event: Option<EventData>) -> Result<Self, SorterError> {
        match (task, event) {
            (Some(task), None) => Ok(Self::Task(task)),
            (None, Some(event)) => Ok(Self::Event(event)),
            (None, None) => Err(SorterError::InvalidInput(
                "neither a task nor an event was supplied".to_string(),
            )),
            (Some(_), Some(_)) => Err(SorterError::InvalidInput(
                "both a task and an event were supplied".to_string(),
            )),
        }
    }

    #[must_use]
    pub fn task_id(&self) -> &str {
        match self {
            Self::Task(task) => &task.id,
            Self::Event(event) => &event.id,
        }
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        match self {
            Self::Task(task) => &task.project_id,
            Self::Event(event) => &event.project_id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Task(task) => &task.content,
            Self::Event(event) => &event.content,
        }
    }

    #[must_use]
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Self::Task(task) => task.section_id.as_deref(),
            Self::Event(event) => event.section_id.as_deref(),
        }
    }

    /// Replace the title, e.g. after it was corrected remotely.
    #[must_use]
    pub fn with_title(mut self, title: String) -> Self {
        match &mut self {
            Self::Task(task) => task.content = title,
            Self::Event(event) => event.content = title,
        }
        self
    }
}

impl From<Task> for TaskSubject {
    fn from(task: Task) -> Self {
        Self::Task(task)
    }
}

impl From<EventData> for TaskSubject {
    fn from(event: EventData) -> Self {
        Self::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: "1".to_string(),
            project_id: "P".to_string(),
            content: "eggs".to_string(),
            section_id: Some("5".to_string()),
        }
    }

    fn event() -> EventData {
        EventData {
            id: "2".to_string(),
            project_id: "P".to_string(),
            content: "milk".to_string(),
            section_id: None,
        }
    }

    #[test]
    fn test_from_parts_accepts_exactly_one() {
        let subject = TaskSubject::from_parts(Some(task()), None).unwrap();
        assert_eq!(subject.task_id(), "1");
        assert_eq!(subject.section_id(), Some("5"));

        let subject = TaskSubject::from_parts(None, Some(event())).unwrap();
        assert_eq!(subject.title(), "milk");
        assert_eq!(subject.section_id(), None);
    }

    #[test]
    fn test_from_parts_rejects_neither() {
        let result = TaskSubject::from_parts(None, None);
        assert!(matches!(result, Err(SorterError::InvalidInput(_))));
    }

    #[test]
    fn test_from_parts_rejects_both() {
        let result = TaskSubject::from_parts(Some(task()), Some(event()));
        assert!(matches!(result, Err(SorterError::InvalidInput(_))));
    }

    #[test]
    fn test_with_title_keeps_other_fields() {
        let subject = TaskSubject::from(task()).with_title("Eggs".to_string());
        assert_eq!(subject.title(), "Eggs");
        assert_eq!(subject.project_id(), "P");
        assert_eq!(subject.section_id(), Some("5"));
    }
}
