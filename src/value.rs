//! Conversions between the JSON values used at the UI boundary and the
//! database values Sea-ORM expects.
//!
//! Rows travel to the host as `serde_json` maps and submitted form values
//! travel back the same way, so the coercion in both directions is driven
//! by the column's declared [`ValueType`](crate::schema::ValueType) rather
//! than by runtime type sniffing.

use chrono::NaiveDate;
use sea_orm::{ColumnType, DbErr, Value};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::{ColumnDescriptor, ValueType};

/// Coerce a JSON value into a database value for the given column.
///
/// JSON `null` maps to the typed SQL NULL of the column's declared type.
/// Text values that parse as UUIDs are passed through as UUID values so
/// that UUID-keyed tables compare correctly.
///
/// # Errors
///
/// Returns a `DbErr` naming the column when the JSON value does not match
/// the declared value type. The message is intended to be shown verbatim.
pub fn db_value(descriptor: &ColumnDescriptor, value: &JsonValue) -> Result<Value, DbErr> {
    if value.is_null() {
        return Ok(null_value(descriptor.value_type));
    }

    let coerced = match descriptor.value_type {
        ValueType::Text => value.as_str().map(|text| {
            Uuid::parse_str(text)
                .map_or_else(|_| Value::from(text.to_owned()), Value::from)
        }),
        ValueType::Integer => value.as_i64().map(Value::from),
        ValueType::Float => value.as_f64().map(Value::from),
        ValueType::Date => value
            .as_str()
            .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
            .map(Value::from),
        ValueType::Boolean => value.as_bool().map(Value::from),
        ValueType::Other => None,
    };

    coerced.ok_or_else(|| {
        DbErr::Custom(format!(
            "column `{}`: cannot convert {value} to {:?}",
            descriptor.name, descriptor.value_type
        ))
    })
}

/// The typed SQL NULL for a declared value type.
#[must_use]
pub fn null_value(value_type: ValueType) -> Value {
    match value_type {
        ValueType::Text | ValueType::Other => Value::String(None),
        ValueType::Integer => Value::BigInt(None),
        ValueType::Float => Value::Double(None),
        ValueType::Date => Value::ChronoDate(None),
        ValueType::Boolean => Value::Bool(None),
    }
}

/// Narrow a coerced value to the physical type of the column it is about
/// to be written into.
///
/// [`db_value`] produces the widest variant of each semantic type
/// (`BigInt`, `Double`), but an active model's `set` expects the exact
/// variant backing the Rust field. The column definition says which one
/// that is.
///
/// # Errors
///
/// Returns a `DbErr` naming the column when the value does not fit the
/// column's integer width.
pub fn fit_column_type(
    column_name: &str,
    column_type: &ColumnType,
    value: Value,
) -> Result<Value, DbErr> {
    let out_of_range =
        |column: &str| DbErr::Custom(format!("column `{column}`: value out of range"));

    Ok(match (column_type, value) {
        (ColumnType::TinyInteger, Value::BigInt(number)) => Value::TinyInt(
            number
                .map(i8::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        (ColumnType::SmallInteger, Value::BigInt(number)) => Value::SmallInt(
            number
                .map(i16::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        (ColumnType::Integer, Value::BigInt(number)) => Value::Int(
            number
                .map(i32::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        (ColumnType::TinyUnsigned, Value::BigInt(number)) => Value::TinyUnsigned(
            number
                .map(u8::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        (ColumnType::SmallUnsigned, Value::BigInt(number)) => Value::SmallUnsigned(
            number
                .map(u16::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        (ColumnType::Unsigned, Value::BigInt(number)) => Value::Unsigned(
            number
                .map(u32::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        (ColumnType::BigUnsigned, Value::BigInt(number)) => Value::BigUnsigned(
            number
                .map(u64::try_from)
                .transpose()
                .map_err(|_| out_of_range(column_name))?,
        ),
        #[allow(clippy::cast_possible_truncation)]
        (ColumnType::Float, Value::Double(number)) => {
            Value::Float(number.map(|value| value as f32))
        }
        // A text column whose value merely looks like a UUID.
        (ColumnType::String(_) | ColumnType::Text | ColumnType::Char(_), Value::Uuid(uuid)) => {
            Value::String(uuid.map(|uuid| Box::new(uuid.to_string())))
        }
        (_, value) => value,
    })
}

/// Render a database value as JSON for the UI boundary.
///
/// Values outside the supported kinds degrade to `null` rather than
/// erroring; unsupported columns are display-only at best.
#[must_use]
pub fn json_value(value: Value) -> JsonValue {
    match value {
        Value::Bool(Some(boolean)) => JsonValue::from(boolean),
        Value::TinyInt(Some(number)) => JsonValue::from(number),
        Value::SmallInt(Some(number)) => JsonValue::from(number),
        Value::Int(Some(number)) => JsonValue::from(number),
        Value::BigInt(Some(number)) => JsonValue::from(number),
        Value::TinyUnsigned(Some(number)) => JsonValue::from(number),
        Value::SmallUnsigned(Some(number)) => JsonValue::from(number),
        Value::Unsigned(Some(number)) => JsonValue::from(number),
        Value::BigUnsigned(Some(number)) => JsonValue::from(number),
        Value::Float(Some(number)) => JsonValue::from(number),
        Value::Double(Some(number)) => JsonValue::from(number),
        Value::String(Some(text)) => JsonValue::from(*text),
        Value::Char(Some(character)) => JsonValue::from(character.to_string()),
        Value::Uuid(Some(uuid)) => JsonValue::from(uuid.to_string()),
        Value::ChronoDate(Some(date)) => JsonValue::from(date.format("%Y-%m-%d").to_string()),
        Value::ChronoDateTime(Some(datetime)) => JsonValue::from(datetime.to_string()),
        Value::ChronoDateTimeUtc(Some(datetime)) => JsonValue::from(datetime.to_rfc3339()),
        _ => JsonValue::Null,
    }
}
