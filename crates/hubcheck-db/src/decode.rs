//! Row → [`Record`] mapping per engine.
//!
//! NUMERIC/DECIMAL values become strings so precision survives; timestamps
//! become ISO-8601 strings; byte columns become lowercase hex. Types not
//! listed fall back to their text form. PostgreSQL values that arrive in
//! binary form and are not printable UTF-8 (INTERVAL, MONEY, INET and the
//! like) become `\x`-prefixed hex, the way `psql` prints raw bytes.

use crate::error::{DatabaseError, Result};
use crate::record::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, ColumnIndex, Row, TypeInfo, ValueRef};
use uuid::Uuid;

type DecodeResult = std::result::Result<Value, sqlx::Error>;

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn decode_row<R, F>(row: &R, decode_value: F) -> Result<Record>
where
    R: Row,
    usize: ColumnIndex<R>,
    F: Fn(&R, usize, &str) -> DecodeResult,
{
    let mut record = Record::new();
    for column in row.columns() {
        let name = column.name();
        let index = column.ordinal();
        let raw = row
            .try_get_raw(index)
            .map_err(|e| DatabaseError::decode(name, e))?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_ascii_uppercase();
            decode_value(row, index, &type_name).map_err(|e| DatabaseError::decode(name, e))?
        };
        record.insert(name, value);
    }
    Ok(record)
}

/// Map a PostgreSQL row.
pub fn pg_row(row: &PgRow) -> Result<Record> {
    decode_row(row, pg_value)
}

fn pg_value(row: &PgRow, i: usize, type_name: &str) -> DecodeResult {
    Ok(match type_name {
        "BOOL" => Value::Bool(row.try_get(i)?),
        "INT2" => Value::from(row.try_get::<i16, _>(i)?),
        "INT4" => Value::from(row.try_get::<i32, _>(i)?),
        "INT8" => Value::from(row.try_get::<i64, _>(i)?),
        "FLOAT4" => Value::from(row.try_get::<f32, _>(i)?),
        "FLOAT8" => Value::from(row.try_get::<f64, _>(i)?),
        "NUMERIC" => Value::String(row.try_get::<Decimal, _>(i)?.to_string()),
        "TIMESTAMPTZ" => Value::String(row.try_get::<DateTime<Utc>, _>(i)?.to_rfc3339()),
        "TIMESTAMP" => Value::String(
            row.try_get::<NaiveDateTime, _>(i)?
                .format(NAIVE_DATETIME_FORMAT)
                .to_string(),
        ),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(i)?.to_string()),
        "TIME" => Value::String(row.try_get::<NaiveTime, _>(i)?.to_string()),
        "UUID" => Value::String(row.try_get::<Uuid, _>(i)?.to_string()),
        "JSON" | "JSONB" => row.try_get::<Value, _>(i)?,
        "BYTEA" => Value::String(hex::encode(row.try_get::<Vec<u8>, _>(i)?)),
        "TEXT[]" | "VARCHAR[]" => Value::from(row.try_get::<Vec<String>, _>(i)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            Value::String(row.try_get::<String, _>(i)?)
        }
        // enums and domains arrive as their text; anything else may be binary
        _ => {
            let raw = row.try_get_raw(i)?;
            text_or_opaque(raw.as_bytes().map_err(sqlx::Error::Decode)?)
        }
    })
}

/// Text when `bytes` read as printable UTF-8, else `\x` followed by hex.
fn text_or_opaque(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.chars().any(|c| c.is_control() && !c.is_whitespace()) => {
            Value::String(text.to_string())
        }
        _ => Value::String(format!("\\x{}", hex::encode(bytes))),
    }
}

/// Map a MySQL row.
pub fn mysql_row(row: &MySqlRow) -> Result<Record> {
    decode_row(row, mysql_value)
}

fn mysql_value(row: &MySqlRow, i: usize, type_name: &str) -> DecodeResult {
    Ok(match type_name {
        "BOOLEAN" => Value::Bool(row.try_get(i)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Value::from(row.try_get_unchecked::<i64, _>(i)?)
        }
        t if t.ends_with("UNSIGNED") => Value::from(row.try_get_unchecked::<u64, _>(i)?),
        "FLOAT" => Value::from(row.try_get::<f32, _>(i)?),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(i)?),
        "DECIMAL" => Value::String(row.try_get::<Decimal, _>(i)?.to_string()),
        "TIMESTAMP" => Value::String(row.try_get::<DateTime<Utc>, _>(i)?.to_rfc3339()),
        "DATETIME" => Value::String(
            row.try_get::<NaiveDateTime, _>(i)?
                .format(NAIVE_DATETIME_FORMAT)
                .to_string(),
        ),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(i)?.to_string()),
        "JSON" => row.try_get::<Value, _>(i)?,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            Value::String(hex::encode(row.try_get_unchecked::<Vec<u8>, _>(i)?))
        }
        _ => Value::String(row.try_get_unchecked::<String, _>(i)?),
    })
}

/// Map a SQLite row.
///
/// SQLite reports the storage class of each value, so only the five
/// fundamental types need handling.
pub fn sqlite_row(row: &SqliteRow) -> Result<Record> {
    decode_row(row, sqlite_value)
}

fn sqlite_value(row: &SqliteRow, i: usize, type_name: &str) -> DecodeResult {
    Ok(match type_name {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(i)?),
        "REAL" => Value::from(row.try_get_unchecked::<f64, _>(i)?),
        "BLOB" => Value::String(hex::encode(row.try_get_unchecked::<Vec<u8>, _>(i)?)),
        _ => Value::String(row.try_get_unchecked::<String, _>(i)?),
    })
}
