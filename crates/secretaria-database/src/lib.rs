//! # secretaria-database
//!
//! Persistence backends behind the `PersistenceBackend` trait: a PostgreSQL
//! client storing JSONB rows with a LISTEN/NOTIFY change feed, and an
//! in-memory substitute seeded from fixtures. [`connect_backend`] picks one
//! from configuration.

pub mod backends;
pub mod connection;
pub mod hub;
pub mod migration;

pub use backends::{Fixtures, MemoryBackend, PostgresBackend, connect_backend};
pub use connection::DatabasePool;
pub use hub::ChangeHub;
