//! Conversions between entities and backend records.

use serde::Serialize;
use serde::de::DeserializeOwned;

use secretaria_core::error::AppError;
use secretaria_core::result::AppResult;
use secretaria_core::types::Record;

/// Serialize an entity into a backend record.
pub fn to_record<T: Serialize>(entity: &T) -> AppResult<Record> {
    match serde_json::to_value(entity)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(AppError::internal(format!(
            "Expected an object record, got {other}"
        ))),
    }
}

/// Deserialize a backend record into an entity.
pub fn from_record<T: DeserializeOwned>(record: Record) -> AppResult<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(record))?)
}

/// Deserialize a batch of records, failing on the first malformed row.
pub fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> AppResult<Vec<T>> {
    records.into_iter().map(from_record).collect()
}
