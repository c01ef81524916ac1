//! Area entity.

pub mod model;

pub use model::Area;
