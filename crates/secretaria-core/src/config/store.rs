//! Document store and change feed configuration.

use serde::{Deserialize, Serialize};

/// Document store behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Revert optimistic local changes when the backend call fails.
    ///
    /// Off by default: the local working set stays the system of record
    /// for the session regardless of backend outcome.
    #[serde(default)]
    pub rollback_on_error: bool,
}

/// Change feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-table broadcast buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer: default_channel_buffer(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}
