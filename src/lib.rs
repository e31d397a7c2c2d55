// TodoStore - Personal task tracker backed by a JSON file

pub mod config;
pub mod error;
pub mod file;
pub mod migrate;
pub mod query;
pub mod record;
pub mod stats;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::StoreError;
pub use file::WriteMode;
pub use query::{Filter, filter, sort};
pub use record::{Priority, RawTask, Status, Task};
pub use stats::{Summary, summarize};
pub use store::TaskStore;
