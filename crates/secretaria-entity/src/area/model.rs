//! Area entity model.

use serde::{Deserialize, Serialize};

use secretaria_core::types::AreaId;

/// An organisational unit (e.g. "Calidad Educativa") that scopes records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    /// Unique area identifier.
    pub id: AreaId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}
