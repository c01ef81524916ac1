//! # secretaria-service
//!
//! The document/folder store. A [`DocumentStore`] is instantiated for one
//! `(area, module)` scope, keeps the working set of folders and documents
//! for that scope, and mediates every mutation through the persistence
//! backend and the upload provider.
//!
//! Collaborators are injected at construction time as `Arc<dyn Trait>`.

pub mod notify;
pub mod store;

pub use notify::{MemorySink, TracingSink};
pub use store::{
    CategorySummary, DocumentStore, RollbackPolicy, SearchResults, StoreWatcher, WorkingSet,
};
