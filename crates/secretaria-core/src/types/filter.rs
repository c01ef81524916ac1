//! Filter types for backend reads.
//!
//! A read takes a conjunction of column filters. Each filter is either an
//! exact match or a set-membership test; values are compared in their text
//! form so that every backend agrees on the semantics.

use serde::{Deserialize, Serialize};

use super::table::Record;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// List membership.
    In,
}

/// A filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A single value (for `Eq`).
    String(String),
    /// A list of values (for `In`).
    StringList(Vec<String>),
}

/// A single filter condition on a named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The column name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    pub value: FilterValue,
}

impl FilterField {
    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl ToString) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: FilterValue::String(value.to_string()),
        }
    }

    /// Shorthand for a set-membership filter.
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self {
            field: field.into(),
            op: FilterOp::In,
            value: FilterValue::StringList(values.into_iter().map(|v| v.to_string()).collect()),
        }
    }

    /// Evaluate this filter against a record.
    ///
    /// The value shape decides the comparison: a single value is an exact
    /// match, a list is set membership. A missing or null column never
    /// matches.
    pub fn matches(&self, record: &Record) -> bool {
        let Some(actual) = record.get(&self.field).and_then(column_text) else {
            return false;
        };
        match &self.value {
            FilterValue::String(expected) => actual == *expected,
            FilterValue::StringList(set) => set.iter().any(|v| *v == actual),
        }
    }
}

/// A conjunction of filters. An empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(pub Vec<FilterField>);

impl Filters {
    /// An empty filter set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add an equality filter.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl ToString) -> Self {
        self.0.push(FilterField::eq(field, value));
        self
    }

    /// Add a set-membership filter.
    pub fn where_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.0.push(FilterField::is_in(field, values));
        self
    }

    /// Whether every filter matches the record.
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|f| f.matches(record))
    }

    /// Iterate over the individual filters.
    pub fn iter(&self) -> impl Iterator<Item = &FilterField> {
        self.0.iter()
    }
}

/// Text form of a JSON column, mirroring PostgreSQL's `->>` operator.
fn column_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_eq_and_in() {
        let row = record(json!({"id": "1", "areaId": "a", "moduleType": "proveedores"}));
        assert!(Filters::new().where_eq("areaId", "a").matches(&row));
        assert!(!Filters::new().where_eq("areaId", "b").matches(&row));
        assert!(
            Filters::new()
                .where_in("moduleType", ["proveedores", "prestacion-servicio"])
                .matches(&row)
        );
        assert!(!Filters::new().where_in("moduleType", Vec::<String>::new()).matches(&row));
    }

    #[test]
    fn test_missing_or_null_never_matches() {
        let row = record(json!({"id": "1", "description": null}));
        assert!(!FilterField::eq("description", "").matches(&row));
        assert!(!FilterField::eq("folderId", "x").matches(&row));
    }

    #[test]
    fn test_non_string_columns_compare_as_text() {
        let row = record(json!({"id": "1", "sizeBytes": 1024}));
        assert!(FilterField::eq("sizeBytes", 1024).matches(&row));
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert!(Filters::new().matches(&Record::new()));
    }
}
