//! Table registry for the persistence backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A row as exchanged with a persistence backend: a JSON object keyed by
/// camelCase column names, always carrying a string `id`.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Tables the dashboard reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Organisational areas.
    Areas,
    /// Categorised folders.
    Carpetas,
    /// Documents placed inside folders.
    Documentos,
}

impl Table {
    /// Every known table.
    pub const ALL: [Table; 3] = [Table::Areas, Table::Carpetas, Table::Documentos];

    /// The table name as stored in the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Areas => "areas",
            Self::Carpetas => "carpetas",
            Self::Documentos => "documentos",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown table '{s}'")))
    }
}
