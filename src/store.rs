// Task store backed by a single JSON file

use crate::error::StoreError;
use crate::file::{self, WriteMode};
use crate::migrate::{self, Normalized};
use crate::record::{Priority, Status, Task};
use eyre::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the task collection and keeps its file in sync
///
/// Every mutation rewrites the whole file before returning, so the in-memory
/// collection and the file agree whenever control is back with the caller.
/// Collection order is creation order.
pub struct TaskStore {
    path: PathBuf,
    write_mode: WriteMode,
    tasks: Vec<Task>,
    next_id: u64,
    load_warning: Option<StoreError>,
}

impl TaskStore {
    /// Open the store at the given file path
    ///
    /// See [`TaskStore::open_with`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, WriteMode::default())
    }

    /// Open the store, choosing how saves replace the file
    ///
    /// A missing file opens an empty store. A corrupted file also opens an
    /// empty store; the problem is kept in [`TaskStore::load_warning`] and the
    /// file is left untouched until the next save. Legacy records are migrated
    /// and written back immediately.
    pub fn open_with<P: AsRef<Path>>(path: P, write_mode: WriteMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut load_warning = None;

        let raw = match file::read_tasks(&path) {
            Ok(raw) => raw,
            Err(report) => match report.downcast::<StoreError>() {
                Ok(err) => {
                    warn!(file = ?path, error = %err, "Task file is corrupted, starting empty");
                    load_warning = Some(err);
                    Vec::new()
                }
                Err(report) => return Err(report),
            },
        };

        let Normalized { tasks, changed } = migrate::normalize(raw);
        let next_id = tasks.iter().map(Task::id).max().unwrap_or(0) + 1;

        let store = Self {
            path,
            write_mode,
            tasks,
            next_id,
            load_warning,
        };

        if changed {
            info!(file = ?store.path, "Migrated legacy task records, writing back");
            store.save().context("Failed to write migrated tasks")?;
        }

        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks in creation order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Set when the file could not be parsed at open time
    pub fn load_warning(&self) -> Option<&StoreError> {
        self.load_warning.as_ref()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a pending task and return its id
    ///
    /// Fails with `StoreError::EmptyText` (and changes nothing) if the text is
    /// blank. The text is stored as given.
    pub fn add(&mut self, text: &str, priority: Option<Priority>) -> Result<u64> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyText.into());
        }

        let id = self.next_id;
        let task = Task::new(id, text, priority.unwrap_or_default());
        debug!(id, priority = %task.priority(), "Adding task");

        self.tasks.push(task);
        self.next_id += 1;
        self.save()?;

        Ok(id)
    }

    /// Set the status of every task whose id is in `ids`
    ///
    /// Returns the number of tasks updated.
    pub fn set_status(&mut self, ids: &[u64], status: Status) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let selected: HashSet<u64> = ids.iter().copied().collect();
        let mut count = 0;
        for task in self.tasks.iter_mut().filter(|t| selected.contains(&t.id())) {
            task.set_status(status);
            count += 1;
        }

        debug!(%status, count, "Set task status");
        self.save()?;

        Ok(count)
    }

    /// Like [`TaskStore::set_status`], taking the status by name
    ///
    /// An unknown name is ignored: nothing changes and no error is returned.
    pub fn set_status_named(&mut self, ids: &[u64], status: &str) -> Result<usize> {
        match status.parse::<Status>() {
            Ok(status) => self.set_status(ids, status),
            Err(_) => {
                debug!(status, "Ignoring unknown status");
                Ok(0)
            }
        }
    }

    /// Advance each selected task one step: pending -> in_progress -> done -> pending
    pub fn cycle_status(&mut self, ids: &[u64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let selected: HashSet<u64> = ids.iter().copied().collect();
        let mut count = 0;
        for task in self.tasks.iter_mut().filter(|t| selected.contains(&t.id())) {
            task.set_status(task.status().next());
            count += 1;
        }

        debug!(count, "Cycled task status");
        self.save()?;

        Ok(count)
    }

    /// Delete every task whose id is in `ids`
    ///
    /// Returns the number of tasks removed. Ids are never handed out again
    /// by this store.
    pub fn remove(&mut self, ids: &[u64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let selected: HashSet<u64> = ids.iter().copied().collect();
        let before = self.tasks.len();
        self.tasks.retain(|t| !selected.contains(&t.id()));
        let count = before - self.tasks.len();

        debug!(count, "Removed tasks");
        self.save()?;

        Ok(count)
    }

    /// Write the full collection over the backing file
    pub fn save(&self) -> Result<()> {
        file::write_tasks(&self.path, &self.tasks, self.write_mode)
    }
}
