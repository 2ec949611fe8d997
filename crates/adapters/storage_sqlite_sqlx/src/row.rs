//! Conversions between JSON values and `SQLite` parameters and rows.

use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::field::FieldType;
use adminkit_domain::record::Record;
use serde_json::{Number, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use crate::error::StorageError;
use crate::sql::Statement;

pub(crate) type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Prepare `statement` with every parameter bound.
pub(crate) fn prepare(statement: &Statement) -> Result<SqliteQuery<'_>, StorageError> {
    tracing::debug!(sql = %statement.sql, params = ?statement.params, "query");
    let mut query = sqlx::query(&statement.sql);
    for (index, value) in statement.params.iter().enumerate() {
        query = bind(query, index, value)?;
    }
    Ok(query)
}

fn bind<'q>(
    query: SqliteQuery<'q>,
    index: usize,
    value: &Value,
) -> Result<SqliteQuery<'q>, StorageError> {
    Ok(match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                query.bind(int)
            } else if let Some(real) = n.as_f64() {
                query.bind(real)
            } else {
                return Err(StorageError::Unsupported(format!("parameter {index}")));
            }
        }
        Value::String(s) => query.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => query.bind(value.to_string()),
    })
}

/// Map a row to a record, using the descriptor to restore booleans and JSON.
pub(crate) fn to_record(row: &SqliteRow, table: &TableDescriptor) -> Result<Record, sqlx::Error> {
    let mut record = Record::new();
    for column in row.columns() {
        let field_type = table.field(column.name()).map(|field| field.field_type);
        let value = cell(row, column.ordinal(), field_type)?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

/// Decode one cell according to its `SQLite` storage class.
pub(crate) fn cell(
    row: &SqliteRow,
    index: usize,
    field_type: Option<FieldType>,
) -> Result<Value, sqlx::Error> {
    let storage = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage.as_str() {
        "INTEGER" => {
            let int: i64 = row.try_get(index)?;
            if field_type == Some(FieldType::Boolean) {
                Value::Bool(int != 0)
            } else {
                Value::from(int)
            }
        }
        "REAL" => {
            let real: f64 = row.try_get(index)?;
            Number::from_f64(real).map_or(Value::Null, Value::Number)
        }
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => {
            let text: String = row.try_get(index)?;
            match field_type {
                Some(FieldType::Json) => {
                    serde_json::from_str(&text).unwrap_or(Value::String(text))
                }
                Some(FieldType::Boolean) => match text.as_str() {
                    "true" | "1" => Value::Bool(true),
                    "false" | "0" => Value::Bool(false),
                    _ => Value::String(text),
                },
                _ => Value::String(text),
            }
        }
    };
    Ok(value)
}
