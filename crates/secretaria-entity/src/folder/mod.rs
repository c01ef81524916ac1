//! Folder entity and its enumerations.

pub mod category;
pub mod model;

pub use category::{FolderCategory, FolderColor};
pub use model::{Folder, FolderPatch, NewFolder};
