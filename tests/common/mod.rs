//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use todoist_sorter::sorter::Sorter;
use todoist_sorter::store::MemoryStore;
use todoist_sorter::todoist::{ApiError, EventData, Task, TaskApi, WebhookEvent};

pub const PROJECT: &str = "2203306141";

/// A call the fake API received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetTasks(String),
    GetTask(String),
    Update { task_id: String, content: String },
    Move { task_id: String, section_id: String },
}

/// In-memory task service recording every call.
#[derive(Debug, Default)]
pub struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    failing_updates: Mutex<HashSet<String>>,
    failing_moves: Mutex<HashSet<String>>,
    failing_listing: Mutex<bool>,
}

impl FakeApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// Make `update_task` time out for this task.
    pub fn fail_updates_for(&self, task_id: &str) {
        self.failing_updates
            .lock()
            .unwrap()
            .insert(task_id.to_string());
    }

    /// Make `move_task` time out for this task.
    pub fn fail_moves_for(&self, task_id: &str) {
        self.failing_moves.lock().unwrap().insert(task_id.to_string());
    }

    /// Make `get_tasks` fail with a server error.
    pub fn fail_listing(&self) {
        *self.failing_listing.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Move { .. }))
            .collect()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn get_tasks(&self, project_id: &str) -> Result<Vec<Task>, ApiError> {
        self.record(Call::GetTasks(project_id.to_string()));
        if *self.failing_listing.lock().unwrap() {
            return Err(ApiError::Status {
                operation: "get_tasks",
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        self.record(Call::GetTask(task_id.to_string()));
        self.task(task_id).ok_or_else(|| ApiError::Status {
            operation: "get_task",
            status: 404,
            body: "Task not found".to_string(),
        })
    }

    async fn update_task(&self, task_id: &str, content: &str) -> Result<(), ApiError> {
        self.record(Call::Update {
            task_id: task_id.to_string(),
            content: content.to_string(),
        });
        if self.failing_updates.lock().unwrap().contains(task_id) {
            return Err(ApiError::Timeout {
                operation: "update_task",
            });
        }
        if let Some(task) = self.tasks.lock().unwrap().iter_mut().find(|t| t.id == task_id) {
            task.content = content.to_string();
        }
        Ok(())
    }

    async fn move_task(&self, task_id: &str, section_id: &str) -> Result<(), ApiError> {
        self.record(Call::Move {
            task_id: task_id.to_string(),
            section_id: section_id.to_string(),
        });
        if self.failing_moves.lock().unwrap().contains(task_id) {
            return Err(ApiError::Timeout {
                operation: "move_task",
            });
        }
        if let Some(task) = self.tasks.lock().unwrap().iter_mut().find(|t| t.id == task_id) {
            task.section_id = Some(section_id.to_string());
        }
        Ok(())
    }
}

pub fn task(id: &str, content: &str, section: Option<&str>) -> Task {
    Task {
        id: id.to_string(),
        project_id: PROJECT.to_string(),
        content: content.to_string(),
        section_id: section.map(String::from),
    }
}

pub fn event(name: &str, id: &str, content: &str, section: Option<&str>) -> WebhookEvent {
    WebhookEvent {
        event_name: name.to_string(),
        event_data: EventData {
            id: id.to_string(),
            project_id: PROJECT.to_string(),
            content: content.to_string(),
            section_id: section.map(String::from),
        },
    }
}

pub async fn open_store(dir: &TempDir) -> MemoryStore {
    MemoryStore::open(dir.path().join("Todoist.db"), PROJECT)
        .await
        .expect("Failed to open memory store")
}

pub async fn sorter_with(api: Arc<FakeApi>, dir: &TempDir) -> Sorter {
    Sorter::new(api, open_store(dir).await)
}
