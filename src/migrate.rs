// Schema migration for loaded task files

use crate::record::{Priority, RawTask, Status, Task};
use serde_json::Value;
use tracing::debug;

/// Result of a migration pass
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub tasks: Vec<Task>,
    /// True when any record had to be rewritten and the file should be saved
    pub changed: bool,
}

/// Bring every loaded record into the canonical shape
///
/// - missing (or unrecognised) `status` is derived from the legacy `done` flag
/// - a `done` flag that disagrees with `status` is corrected
/// - missing (or unrecognised) `priority` becomes `medium`
///
/// Storage order and unknown fields are kept as they are.
pub fn normalize(raw: Vec<RawTask>) -> Normalized {
    let mut changed = false;

    let tasks = raw
        .into_iter()
        .map(|record| {
            let (task, migrated) = normalize_record(record);
            changed |= migrated;
            task
        })
        .collect();

    Normalized { tasks, changed }
}

fn normalize_record(raw: RawTask) -> (Task, bool) {
    let mut migrated = false;

    let status = match raw.status.as_ref().and_then(Value::as_str).and_then(|s| s.parse::<Status>().ok()) {
        Some(status) => status,
        None => {
            debug!(id = raw.id, status = ?raw.status, done = ?raw.done, "Deriving status from done flag");
            migrated = true;
            if raw.done.as_ref().is_some_and(is_truthy) { Status::Done } else { Status::Pending }
        }
    };

    if raw.done != Some(Value::Bool(status == Status::Done)) {
        migrated = true;
    }

    let priority = match raw.priority.as_ref().and_then(Value::as_str).and_then(|p| p.parse::<Priority>().ok()) {
        Some(priority) => priority,
        None => {
            debug!(id = raw.id, priority = ?raw.priority, "Defaulting priority");
            migrated = true;
            Priority::default()
        }
    };

    let task = Task::new(raw.id, raw.task, priority)
        .with_status(status)
        .with_extra(raw.extra);

    (task, migrated)
}

/// Truthiness of a legacy `done` value: null, false, zero and empty values are false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTask {
        serde_json::from_value(value).unwrap()
    }

    fn to_raw(task: &Task) -> RawTask {
        RawTask {
            id: task.id(),
            task: task.text().to_string(),
            status: Some(json!(task.status())),
            done: Some(json!(task.is_done())),
            priority: Some(json!(task.priority())),
            extra: task.extra().clone(),
        }
    }

    fn renormalize(normalized: &Normalized) -> Normalized {
        normalize(normalized.tasks.iter().map(to_raw).collect())
    }

    #[test]
    fn test_legacy_done_flag_migrates() {
        let result = normalize(vec![
            raw(json!({"id": 1, "task": "old done", "done": true})),
            raw(json!({"id": 2, "task": "old open", "done": false})),
            raw(json!({"id": 3, "task": "no flags"})),
        ]);

        assert!(result.changed);
        let statuses: Vec<Status> = result.tasks.iter().map(|t| t.status()).collect();
        assert_eq!(statuses, vec![Status::Done, Status::Pending, Status::Pending]);
        assert!(result.tasks.iter().all(|t| t.priority() == Priority::Medium));
    }

    #[test]
    fn test_current_shape_is_unchanged() {
        let result = normalize(vec![raw(json!({
            "id": 4,
            "task": "current",
            "status": "in_progress",
            "done": false,
            "priority": "high"
        }))]);

        assert!(!result.changed);
        assert_eq!(result.tasks[0].status(), Status::InProgress);
        assert_eq!(result.tasks[0].priority(), Priority::High);
    }

    #[test]
    fn test_missing_priority_alone_counts_as_change() {
        let result = normalize(vec![raw(json!({
            "id": 1, "task": "t", "status": "pending", "done": false
        }))]);
        assert!(result.changed);
        assert_eq!(result.tasks[0].priority(), Priority::Medium);
    }

    #[test]
    fn test_status_wins_over_inconsistent_done() {
        let result = normalize(vec![raw(json!({
            "id": 1, "task": "t", "status": "done", "done": false, "priority": "low"
        }))]);
        assert!(result.changed);
        assert_eq!(result.tasks[0].status(), Status::Done);
        assert!(result.tasks[0].is_done());
    }

    #[test]
    fn test_unknown_values_are_migrated() {
        let result = normalize(vec![raw(json!({
            "id": 1, "task": "t", "status": "archived", "done": true, "priority": "urgent"
        }))]);
        assert!(result.changed);
        assert_eq!(result.tasks[0].status(), Status::Done);
        assert_eq!(result.tasks[0].priority(), Priority::Medium);
    }

    #[test]
    fn test_wrongly_typed_legacy_fields_are_migrated() {
        let result = normalize(vec![
            raw(json!({"id": 1, "task": "numeric done", "done": 1})),
            raw(json!({"id": 2, "task": "numeric status", "status": 1, "done": false})),
            raw(json!({"id": 3, "task": "zero done", "done": 0, "priority": 3})),
            raw(json!({"id": 4, "task": "string done", "done": "yes", "status": null})),
        ]);

        assert!(result.changed);
        let statuses: Vec<Status> = result.tasks.iter().map(|t| t.status()).collect();
        assert_eq!(statuses, vec![Status::Done, Status::Pending, Status::Pending, Status::Done]);
        assert_eq!(result.tasks[2].priority(), Priority::Medium);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_extra_fields_survive() {
        let result = normalize(vec![raw(json!({"id": 9, "task": "t", "note": {"a": 1}}))]);
        assert_eq!(result.tasks[0].extra()["note"], json!({"a": 1}));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let first = normalize(vec![
            raw(json!({"id": 1, "task": "a", "done": true, "x": 1})),
            raw(json!({"id": 5, "task": "b", "status": "in_progress", "priority": "bogus"})),
            raw(json!({"id": 3, "task": "c", "status": "pending", "done": false, "priority": "low"})),
        ]);
        let second = renormalize(&first);

        assert!(!second.changed);
        assert_eq!(second.tasks, first.tasks);
    }

    #[test]
    fn test_preserves_order() {
        let result = normalize(vec![
            raw(json!({"id": 3, "task": "c"})),
            raw(json!({"id": 1, "task": "a"})),
        ]);
        let ids: Vec<u64> = result.tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
