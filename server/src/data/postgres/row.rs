//! PostgreSQL row decoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::postgres::types::{Oid, PgInterval, PgMoney};
use sqlx::types::{Decimal, Uuid};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::data::error::DataError;
use crate::data::traits::JsonRow;

/// Convert a row to a JSON object keyed by column name.
///
/// NUMERIC and MONEY are rendered as decimal strings so no precision is lost.
/// Types without a JSON mapping are read as text when their wire form is
/// text, such as enums and domains over text, else `null`.
pub(super) fn to_json(row: &PgRow) -> Result<JsonRow, DataError> {
    let mut out = JsonRow::new();
    for column in row.columns() {
        let i = column.ordinal();
        let raw = row.try_get_raw(i).map_err(DataError::from_postgres)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            decode(row, i, column.type_info().name())?
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn decode(row: &PgRow, i: usize, type_name: &str) -> Result<Value, DataError> {
    let value = match type_name {
        "BOOL" => row.try_get::<bool, _>(i).map(Value::from),
        "INT2" => row.try_get::<i16, _>(i).map(Value::from),
        "INT4" => row.try_get::<i32, _>(i).map(Value::from),
        "INT8" => row.try_get::<i64, _>(i).map(Value::from),
        "FLOAT4" => row.try_get::<f32, _>(i).map(Value::from),
        "FLOAT8" => row.try_get::<f64, _>(i).map(Value::from),
        "OID" => row.try_get::<Oid, _>(i).map(|o| Value::from(o.0)),
        "NUMERIC" => match row.try_get::<Decimal, _>(i) {
            Ok(d) => Ok(Value::from(d.to_string())),
            // NaN and out-of-range values have no Decimal form
            Err(e) => {
                tracing::trace!(error = %e, "NUMERIC value not representable");
                return Ok(Value::Null);
            }
        },
        "MONEY" => row
            .try_get::<PgMoney, _>(i)
            .map(|m| Value::from(m.to_decimal(2).to_string())),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            row.try_get::<String, _>(i).map(Value::from)
        }
        "JSON" | "JSONB" => row.try_get::<Value, _>(i),
        "UUID" => row.try_get::<Uuid, _>(i).map(|u| Value::from(u.to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(i)
            .map(|t| Value::from(t.to_rfc3339())),
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(i)
            .map(|t| Value::from(t.to_string())),
        "DATE" => row
            .try_get::<NaiveDate, _>(i)
            .map(|d| Value::from(d.to_string())),
        "TIME" => row
            .try_get::<NaiveTime, _>(i)
            .map(|t| Value::from(t.to_string())),
        "INTERVAL" => row.try_get::<PgInterval, _>(i).map(|iv| {
            serde_json::json!({
                "months": iv.months,
                "days": iv.days,
                "microseconds": iv.microseconds,
            })
        }),
        "BYTEA" => row
            .try_get::<Vec<u8>, _>(i)
            .map(|b| Value::from(BASE64.encode(b))),
        other => return Ok(text_or_null(row, i, other)),
    };
    value.map_err(DataError::from_postgres)
}

fn text_or_null(row: &PgRow, i: usize, type_name: &str) -> Value {
    match row.try_get_unchecked::<String, _>(i) {
        Ok(text) => Value::from(text),
        Err(e) => {
            tracing::trace!(type_name, error = %e, "No JSON mapping for column type");
            Value::Null
        }
    }
}

/// First column of the row as a count
pub(super) fn count(row: &PgRow) -> Result<i64, DataError> {
    row.try_get::<i64, _>(0).map_err(DataError::from_postgres)
}
