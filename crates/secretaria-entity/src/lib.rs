//! # secretaria-entity
//!
//! Domain entity models for the Secretaría dashboard. Every struct in this
//! crate represents a backend row or a domain value object. Rows serialize
//! with camelCase field names, which are also the column names used by
//! backend filters.

pub mod area;
pub mod document;
pub mod folder;
pub mod record;
pub mod scope;

pub use area::Area;
pub use document::{Document, NewDocument};
pub use folder::{Folder, FolderCategory, FolderColor, FolderPatch, NewFolder};
pub use scope::{ModuleType, Scope};
