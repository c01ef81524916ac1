//! Document/folder store.

pub mod service;
pub mod watcher;
pub mod working_set;

pub use service::{DocumentStore, RollbackPolicy};
pub use watcher::StoreWatcher;
pub use working_set::{CategorySummary, SearchResults, WorkingSet};
