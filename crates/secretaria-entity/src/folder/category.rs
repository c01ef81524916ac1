//! Folder category and color enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use secretaria_core::AppError;

/// Contractual phase a folder is bucketed under.
///
/// The category decides which tab a folder is displayed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FolderCategory {
    /// Before the contract is signed.
    PreContractual,
    /// While the contract is being executed.
    Execution,
    /// Contract closure and liquidation.
    Closure,
}

impl FolderCategory {
    /// Every category, in tab order.
    pub const ALL: [FolderCategory; 3] = [Self::PreContractual, Self::Execution, Self::Closure];

    /// Return the category as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreContractual => "preContractual",
            Self::Execution => "execution",
            Self::Closure => "closure",
        }
    }

    /// Tab label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PreContractual => "Precontractual",
            Self::Execution => "Ejecución",
            Self::Closure => "Cierre",
        }
    }
}

impl fmt::Display for FolderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FolderCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Invalid folder category: '{s}'. Expected one of: preContractual, execution, closure"
                ))
            })
    }
}

/// Fixed palette a folder color is chosen from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderColor {
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Red.
    Red,
    /// Purple.
    Purple,
    /// Orange.
    Orange,
    /// Gray.
    Gray,
}

impl FolderColor {
    /// The whole palette.
    pub const PALETTE: [FolderColor; 7] = [
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Red,
        Self::Purple,
        Self::Orange,
        Self::Gray,
    ];

    /// Return the color as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for FolderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FolderColor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::PALETTE
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| AppError::validation(format!("Invalid folder color: '{s}'")))
    }
}
