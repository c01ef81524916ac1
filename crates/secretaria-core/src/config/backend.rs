//! Persistence backend selection.

use serde::{Deserialize, Serialize};

/// Which persistence backend to instantiate at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-memory substitute, optionally seeded from fixtures.
    #[default]
    Memory,
    /// PostgreSQL.
    Postgres,
}

/// Backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind.
    #[serde(default)]
    pub kind: BackendKind,
    /// JSON fixtures file used to seed the in-memory backend.
    #[serde(default)]
    pub fixtures: Option<String>,
    /// Save the in-memory tables back to `fixtures` after each successful command.
    #[serde(default)]
    pub write_back: bool,
}
