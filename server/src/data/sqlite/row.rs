//! SQLite row decoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::data::error::DataError;
use crate::data::traits::JsonRow;

/// Convert a row to a JSON object keyed by column name.
///
/// Storage classes map to JSON directly; blobs become base64 text.
pub(super) fn to_json(row: &SqliteRow) -> Result<JsonRow, DataError> {
    let mut out = JsonRow::new();
    for column in row.columns() {
        let i = column.ordinal();
        let raw = row.try_get_raw(i).map_err(DataError::from_sqlite)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            decode(row, i, &type_name).map_err(DataError::from_sqlite)?
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode(row: &SqliteRow, i: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "INTEGER" | "INT8" => Value::from(row.try_get_unchecked::<i64, _>(i)?),
        "BOOLEAN" => Value::from(row.try_get_unchecked::<bool, _>(i)?),
        "REAL" | "NUMERIC" => Value::from(row.try_get_unchecked::<f64, _>(i)?),
        "BLOB" => Value::from(BASE64.encode(row.try_get_unchecked::<Vec<u8>, _>(i)?)),
        _ => Value::from(row.try_get_unchecked::<String, _>(i)?),
    };
    Ok(value)
}

/// First column of the row as a count
pub(super) fn count(row: &SqliteRow) -> Result<i64, DataError> {
    row.try_get::<i64, _>(0).map_err(DataError::from_sqlite)
}
