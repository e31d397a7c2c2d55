// Completion statistics

use crate::record::{Status, Task};
use serde::Serialize;

/// Per-status counts for a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
    /// Share of done tasks, truncated to a whole percent; 0 for no tasks
    pub completion_percent: u32,
}

impl Summary {
    /// Untruncated share of done tasks in `0.0..=1.0`
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

pub fn summarize<'a, I>(tasks: I) -> Summary
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut summary = Summary::default();

    for task in tasks {
        summary.total += 1;
        match task.status() {
            Status::Pending => summary.pending += 1,
            Status::InProgress => summary.in_progress += 1,
            Status::Done => summary.done += 1,
        }
    }

    // Integer division truncates toward zero
    if summary.total > 0 {
        summary.completion_percent = (summary.done * 100 / summary.total) as u32;
    }

    summary
}
