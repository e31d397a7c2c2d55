// Task record schema

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        }
    }

    /// Next status in the cycle pending -> in_progress -> done -> pending
    pub fn next(self) -> Status {
        match self {
            Status::Pending => Status::InProgress,
            Status::InProgress => Status::Done,
            Status::Done => Status::Pending,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid status: {} (expected pending, in_progress or done)", s))
    }
}

/// Display/sort weight of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Sort rank, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| format!("invalid priority: {} (expected low, medium or high)", s))
    }
}

/// Canonical, fully-populated task record
///
/// `id`, `text` and `priority` are fixed at creation; only the status moves.
/// The legacy `done` flag is not stored, it is derived from `status` when the
/// record is written out.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: u64,
    text: String,
    status: Status,
    priority: Priority,
    extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: u64, text: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            text: text.into(),
            status: Status::Pending,
            priority,
            extra: Map::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Mirror of `status == done`, kept for older task files
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    /// Fields this crate does not know about, kept verbatim
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Text as shown in a list: trimmed, or a placeholder when blank
    pub fn display_text(&self) -> &str {
        match self.text.trim() {
            "" => "(untitled)",
            trimmed => trimmed,
        }
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

impl Serialize for Task {
    /// Known fields first, with the `done` mirror materialized, then the
    /// unknown fields in the order they were read
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5 + self.extra.len()))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("task", &self.text)?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("done", &self.is_done())?;
        map.serialize_entry("priority", &self.priority)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Task as read from disk, before migration
///
/// Only `id` and `task` are required. `status`, `done` and `priority` are kept
/// as raw JSON values so a missing, unknown or wrongly-typed value migrates
/// instead of rejecting the whole file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTask {
    pub id: u64,
    pub task: String,
    pub status: Option<Value>,
    pub done: Option<Value>,
    pub priority: Option<Value>,
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for RawTask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;

        let id = match fields.shift_remove("id") {
            Some(value) => value
                .as_u64()
                .ok_or_else(|| D::Error::custom(format!("invalid task id: {}", value)))?,
            None => return Err(D::Error::missing_field("id")),
        };

        let task = match fields.shift_remove("task") {
            Some(Value::String(text)) => text,
            Some(other) => return Err(D::Error::custom(format!("invalid task text: {}", other))),
            None => return Err(D::Error::missing_field("task")),
        };

        Ok(Self {
            id,
            task,
            status: fields.shift_remove("status"),
            done: fields.shift_remove("done"),
            priority: fields.shift_remove("priority"),
            extra: fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_cycle_wraps() {
        assert_eq!(Status::Pending.next(), Status::InProgress);
        assert_eq!(Status::InProgress.next(), Status::Done);
        assert_eq!(Status::Done.next(), Status::Pending);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("in_progress".parse::<Status>().unwrap(), Status::InProgress);
        assert!("finished".parse::<Status>().is_err());
        assert!("Done".parse::<Status>().is_err());
    }

    #[test]
    fn test_priority_rank_and_default() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new(1, "Write report", Priority::High);
        assert_eq!(task.status(), Status::Pending);
        assert!(!task.is_done());
        assert!(task.extra().is_empty());
    }

    #[test]
    fn test_serialize_materializes_done() {
        let task = Task::new(3, "Ship", Priority::Low).with_status(Status::Done);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "task": "Ship", "status": "done", "done": true, "priority": "low"})
        );
    }

    #[test]
    fn test_serialize_keeps_extra_fields() {
        let mut extra = Map::new();
        extra.insert("tags".to_string(), json!(["home"]));
        let task = Task::new(1, "Water plants", Priority::Medium).with_extra(extra);

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["tags"], json!(["home"]));
        assert_eq!(value["done"], json!(false));
    }

    #[test]
    fn test_raw_task_captures_unknown_fields() {
        let raw: RawTask = serde_json::from_value(json!({
            "id": 7,
            "task": "Legacy",
            "done": true,
            "due": "2024-05-01"
        }))
        .unwrap();

        assert_eq!(raw.id, 7);
        assert_eq!(raw.status, None);
        assert_eq!(raw.done, Some(json!(true)));
        assert_eq!(raw.priority, None);
        assert_eq!(raw.extra.len(), 1);
        assert_eq!(raw.extra["due"], json!("2024-05-01"));
    }

    #[test]
    fn test_raw_task_requires_id_and_text() {
        assert!(serde_json::from_value::<RawTask>(json!({"task": "no id"})).is_err());
        assert!(serde_json::from_value::<RawTask>(json!({"id": 1})).is_err());
        assert!(serde_json::from_value::<RawTask>(json!({"id": "1", "task": "t"})).is_err());
        assert!(serde_json::from_value::<RawTask>(json!({"id": 1, "task": 5})).is_err());
    }

    #[test]
    fn test_raw_task_keeps_wrongly_typed_legacy_fields() {
        let raw: RawTask =
            serde_json::from_value(json!({"id": 2, "task": "t", "status": 1, "done": 1, "priority": null}))
                .unwrap();

        assert_eq!(raw.status, Some(json!(1)));
        assert_eq!(raw.done, Some(json!(1)));
        assert_eq!(raw.priority, Some(Value::Null));
        assert!(raw.extra.is_empty());
    }

    #[test]
    fn test_extra_fields_keep_order_and_precision() {
        let input = r#"{"id":1,"task":"t","ext":123456789012345678901234567890,"z":1,"a":{"y":0.10000000000000000000001,"b":2}}"#;
        let raw: RawTask = serde_json::from_str(input).unwrap();
        let task = Task::new(raw.id, raw.task, Priority::Medium).with_extra(raw.extra);

        let output = serde_json::to_string(&task).unwrap();
        assert_eq!(
            output,
            r#"{"id":1,"task":"t","status":"pending","done":false,"priority":"medium","ext":123456789012345678901234567890,"z":1,"a":{"y":0.10000000000000000000001,"b":2}}"#
        );
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Task::new(1, "  Buy milk \n", Priority::Medium).display_text(), "Buy milk");
        assert_eq!(Task::new(2, "   ", Priority::Medium).display_text(), "(untitled)");
    }
}
