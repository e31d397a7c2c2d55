// Filtering and display ordering for task lists

use crate::record::{Priority, Status, Task};

/// Constraints for listing tasks
///
/// Unset fields and an empty search string do not constrain anything; the
/// active constraints are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of the task text, trimmed before matching
    pub search: String,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: impl Into<Option<Status>>) -> Self {
        self.status = status.into();
        self
    }

    pub fn priority(mut self, priority: impl Into<Option<Priority>>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_with(task, &self.needle())
    }

    fn needle(&self) -> String {
        self.search.trim().to_lowercase()
    }

    fn matches_with(&self, task: &Task, needle: &str) -> bool {
        if self.status.is_some_and(|status| task.status() != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority() != priority) {
            return false;
        }
        needle.is_empty() || task.text().to_lowercase().contains(needle)
    }
}

/// Keep the tasks that satisfy `filter`, in their input order
pub fn filter<'a, I>(tasks: I, filter: &Filter) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let needle = filter.needle();
    tasks.into_iter().filter(|task| filter.matches_with(task, &needle)).collect()
}

/// Display order: high before medium before low, then by id
///
/// Storage order is untouched; this only orders the returned references.
pub fn sort<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by_key(|task| (task.priority().rank(), task.id()));
    sorted
}
