//! # secretaria-core
//!
//! Core crate for the Secretaría de Educación dashboard. Contains the
//! boundary traits (persistence, uploads, notifications), configuration
//! schemas, typed identifiers, change events, filter types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Secretaría crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
