//! Shared value types used across crates.

pub mod filter;
pub mod id;
pub mod table;

pub use filter::{FilterField, FilterOp, FilterValue, Filters};
pub use id::{AreaId, DocumentId, FolderId, UserId};
pub use table::{Record, Table};
