//! # secretaria-storage
//!
//! Upload providers: turn a raw file into a retrievable URL plus size and
//! MIME metadata.

pub mod mime;
pub mod providers;

pub use providers::local::LocalUploadProvider;
