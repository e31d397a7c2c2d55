// Task file operations

use crate::error::StoreError;
use crate::record::{RawTask, Task};
use eyre::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How `write_tasks` replaces the file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write a sibling temp file, then rename it over the target
    #[default]
    Atomic,
    /// Truncate and rewrite the target in place
    Overwrite,
}

/// Read all records from a task file
///
/// A missing file is an empty collection. A file that is not a JSON array of
/// task objects yields `StoreError::Corrupted`; the file itself is left alone.
pub fn read_tasks(path: &Path) -> Result<Vec<RawTask>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(file = ?path, "Task file does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(corrupted(path, "file is not valid UTF-8"));
        }
        Err(e) => return Err(e).context(format!("Failed to read task file {:?}", path)),
    };

    let records: Vec<RawTask> = serde_json::from_str(&content).map_err(|e| corrupted(path, e))?;

    info!(file = ?path, count = records.len(), "Loaded tasks from file");

    Ok(records)
}

/// Replace the task file with the full collection
///
/// Output is pretty-printed UTF-8 with non-ASCII written literally.
pub fn write_tasks(path: &Path, tasks: &[Task], mode: WriteMode) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create task file directory")?;
    }

    let mut json = serde_json::to_string_pretty(tasks).context("Failed to serialize tasks")?;
    json.push('\n');

    match mode {
        WriteMode::Atomic => {
            let temp_path = temp_path(path);
            fs::write(&temp_path, &json).context(format!("Failed to write temp file {:?}", temp_path))?;
            fs::rename(&temp_path, path).context(format!("Failed to replace task file {:?}", path))?;
        }
        WriteMode::Overwrite => {
            fs::write(path, &json).context(format!("Failed to write task file {:?}", path))?;
        }
    }

    debug!(file = ?path, count = tasks.len(), ?mode, "Saved tasks");

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn corrupted(path: &Path, reason: impl ToString) -> eyre::Report {
    StoreError::Corrupted {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}
