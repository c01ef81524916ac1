//! Upload provider implementations.

pub mod local;
