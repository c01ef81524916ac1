//! Change events delivered by persistence backends.
//!
//! Every committed write on a table is announced to subscribers of that
//! table as a [`ChangeEvent`], carrying the row image after (`new`) and
//! before (`old`) the change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::table::{Record, Table};

/// The kind of write that produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single row change on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// What happened to the row.
    pub event_type: ChangeKind,
    /// The table the row belongs to.
    pub table: Table,
    /// Row image after the change (absent for deletes).
    #[serde(default)]
    pub new: Option<Record>,
    /// Row image before the change (absent for inserts).
    #[serde(default)]
    pub old: Option<Record>,
}

impl ChangeEvent {
    /// An insert event.
    pub fn insert(table: Table, new: Record) -> Self {
        Self {
            event_type: ChangeKind::Insert,
            table,
            new: Some(new),
            old: None,
        }
    }

    /// An update event.
    pub fn update(table: Table, old: Record, new: Record) -> Self {
        Self {
            event_type: ChangeKind::Update,
            table,
            new: Some(new),
            old: Some(old),
        }
    }

    /// A delete event.
    pub fn delete(table: Table, old: Record) -> Self {
        Self {
            event_type: ChangeKind::Delete,
            table,
            new: None,
            old: Some(old),
        }
    }

    /// The id of the affected row, taken from whichever image is present.
    pub fn row_id(&self) -> Option<&str> {
        self.new
            .as_ref()
            .or(self.old.as_ref())
            .and_then(|r| r.get("id"))
            .and_then(|v| v.as_str())
    }
}
