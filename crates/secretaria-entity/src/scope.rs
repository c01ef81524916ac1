//! The `(area, module)` pair every folder and document is scoped by.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use secretaria_core::error::AppError;
use secretaria_core::types::AreaId;

/// Functional context within an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    /// Vendor records.
    #[serde(rename = "proveedores")]
    Proveedores,
    /// Service-provision records.
    #[serde(rename = "prestacion-servicio")]
    PrestacionServicio,
}

impl ModuleType {
    /// The module value as stored and filtered on.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proveedores => "proveedores",
            Self::PrestacionServicio => "prestacion-servicio",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proveedores" => Ok(Self::Proveedores),
            "prestacion-servicio" => Ok(Self::PrestacionServicio),
            other => Err(AppError::validation(format!("Unknown module '{other}'"))),
        }
    }
}

/// Instantiation key of a document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Owning area.
    pub area_id: AreaId,
    /// Owning module.
    pub module_type: ModuleType,
}

impl Scope {
    /// Create a scope.
    pub fn new(area_id: AreaId, module_type: ModuleType) -> Self {
        Self {
            area_id,
            module_type,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.area_id, self.module_type)
    }
}
