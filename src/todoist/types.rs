//! Todoist task and webhook payload types.

use serde::{Deserialize, Deserializer, Serialize};

/// A task as returned by the Todoist API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub project_id: String,
    pub content: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub section_id: Option<String>,
}

/// One page of `GET /tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPage {
    pub results: Vec<Task>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Webhook events that drive sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventName {
    ItemAdded,
    ItemUpdated,
    ItemCompleted,
}

impl EventName {
    /// Parse a Todoist `event_name`; other events are not handled.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "item:added" => Some(Self::ItemAdded),
            "item:updated" => Some(Self::ItemUpdated),
            "item:completed" => Some(Self::ItemCompleted),
            _ => None,
        }
    }

    /// Wire name of the event.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemAdded => "item:added",
            Self::ItemUpdated => "item:updated",
            Self::ItemCompleted => "item:completed",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `event_data` object of an item webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub project_id: String,
    pub content: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub section_id: Option<String>,
}

/// Body of `POST /todoist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_name: String,
    pub event_data: EventData,
}

/// Todoist has sent ids both as strings and as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ignores_unknown_fields() {
        let json = r#"{
            "id": "7025",
            "project_id": "2203306141",
            "section_id": null,
            "content": "buy milk",
            "priority": 1,
            "labels": []
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "7025");
        assert_eq!(task.content, "buy milk");
        assert_eq!(task.section_id, None);
    }

    #[test]
    fn test_task_accepts_numeric_ids() {
        let json = r#"{"id": 7025, "project_id": 42, "section_id": 5, "content": "Eggs"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "7025");
        assert_eq!(task.project_id, "42");
        assert_eq!(task.section_id, Some("5".to_string()));
    }

    #[test]
    fn test_task_page_without_cursor() {
        let json = r#"{"results": []}"#;
        let page: TaskPage = serde_json::from_str(json).unwrap();
        assert!(page.results.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_event_name_parse() {
        assert_eq!(EventName::parse("item:added"), Some(EventName::ItemAdded));
        assert_eq!(EventName::parse("item:updated"), Some(EventName::ItemUpdated));
        assert_eq!(
            EventName::parse("item:completed"),
            Some(EventName::ItemCompleted)
        );
        assert_eq!(EventName::parse("item:deleted"), None);
        assert_eq!(EventName::ItemAdded.to_string(), "item:added");
    }

    #[test]
    fn test_webhook_event_missing_content_is_rejected() {
        let json = r#"{"event_name": "item:added", "event_data": {"id": "1", "project_id": "2"}}"#;
        assert!(serde_json::from_str::<WebhookEvent>(json).is_err());
    }

    #[test]
    fn test_webhook_event_section_defaults_to_none() {
        let json = r#"{
            "event_name": "item:added",
            "event_data": {"id": "1", "project_id": "2", "content": "eggs"}
        }"#;
        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_data.section_id, None);
    }
}
