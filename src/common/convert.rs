use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::common::{Value, ValueType};
use crate::errors::{ErrorKind, RowbindError, RowbindResult};

/// Governs how aggressively compiled accessors insert cross-type
/// conversions between column and attribute types.
///
/// The policy is process-wide (see [crate::set_conversion_policy]) and is
/// sampled once when an accessor plan is built; plans compiled under one
/// policy are unaffected by later changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub enum ConversionPolicy {
    /// Only direct casts are emitted; a type mismatch surfaces at
    /// invocation time as a conversion error.
    #[default]
    Strict,
    /// Standard widening/narrowing conversions, string parsing/formatting
    /// and guid coercions are emitted where a conversion path exists.
    Automatic,
}

/// Directly casts a value to the target type.
///
/// Identity on an exact variant match, `Null` passes through, and a target
/// of `Object` accepts anything. Everything else fails with a conversion
/// error at invocation time; feasibility is never pre-checked at plan
/// build.
pub fn strict_cast(value: Value, target: ValueType) -> RowbindResult<Value> {
    if value.is_null() || target == ValueType::Object || value.value_type() == target {
        return Ok(value);
    }
    Err(RowbindError::new(
        &format!(
            "Cannot cast value of type {:?} to {:?}",
            value.value_type(),
            target
        ),
        ErrorKind::Conversion,
    ))
}

/// Converts a value to the target type under the Automatic policy.
///
/// Supports the standard conversion family: numeric widening/narrowing
/// across the integer and float types, bool↔numeric, numeric↔string,
/// string↔bool, string↔guid, string↔date/time. When no conversion path
/// exists the function falls back to [strict_cast].
///
/// Narrowing conversions truncate; this mirrors the behavior of the
/// standard conversion routines the plans delegate to.
pub fn auto_convert(value: Value, target: ValueType) -> RowbindResult<Value> {
    if value.is_null() || target == ValueType::Object || value.value_type() == target {
        return Ok(value);
    }

    match target {
        ValueType::Bool => convert_to_bool(value),
        ValueType::I8 => convert_to_i64(value).map(|i| Value::I8(i as i8)),
        ValueType::I16 => convert_to_i64(value).map(|i| Value::I16(i as i16)),
        ValueType::I32 => convert_to_i64(value).map(|i| Value::I32(i as i32)),
        ValueType::I64 => convert_to_i64(value).map(Value::I64),
        ValueType::F32 => convert_to_f64(value).map(|f| Value::F32(f as f32)),
        ValueType::F64 => convert_to_f64(value).map(Value::F64),
        ValueType::String => convert_to_string(value),
        ValueType::Guid => convert_to_guid(value),
        ValueType::DateTime => convert_to_date_time(value),
        _ => strict_cast(value, target),
    }
}

fn conversion_error(value: &Value, target: ValueType) -> RowbindError {
    RowbindError::new(
        &format!(
            "Cannot convert value of type {:?} to {:?}",
            value.value_type(),
            target
        ),
        ErrorKind::Conversion,
    )
}

fn convert_to_bool(value: Value) -> RowbindResult<Value> {
    match &value {
        Value::I8(i) => Ok(Value::Bool(*i != 0)),
        Value::I16(i) => Ok(Value::Bool(*i != 0)),
        Value::I32(i) => Ok(Value::Bool(*i != 0)),
        Value::I64(i) => Ok(Value::Bool(*i != 0)),
        Value::F32(f) => Ok(Value::Bool(*f != 0.0)),
        Value::F64(f) => Ok(Value::Bool(*f != 0.0)),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(conversion_error(&value, ValueType::Bool)),
        },
        _ => strict_cast(value, ValueType::Bool),
    }
}

fn convert_to_i64(value: Value) -> RowbindResult<i64> {
    match &value {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::I8(i) => Ok(i64::from(*i)),
        Value::I16(i) => Ok(i64::from(*i)),
        Value::I32(i) => Ok(i64::from(*i)),
        Value::I64(i) => Ok(*i),
        Value::F32(f) => Ok(*f as i64),
        Value::F64(f) => Ok(*f as i64),
        Value::String(s) => Ok(s.trim().parse::<i64>()?),
        _ => Err(conversion_error(&value, ValueType::I64)),
    }
}

fn convert_to_f64(value: Value) -> RowbindResult<f64> {
    match &value {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::I8(i) => Ok(f64::from(*i)),
        Value::I16(i) => Ok(f64::from(*i)),
        Value::I32(i) => Ok(f64::from(*i)),
        Value::I64(i) => Ok(*i as f64),
        Value::F32(f) => Ok(f64::from(*f)),
        Value::F64(f) => Ok(*f),
        Value::String(s) => Ok(s.trim().parse::<f64>()?),
        _ => Err(conversion_error(&value, ValueType::F64)),
    }
}

fn convert_to_string(value: Value) -> RowbindResult<Value> {
    match &value {
        Value::Bool(_)
        | Value::I8(_)
        | Value::I16(_)
        | Value::I32(_)
        | Value::I64(_)
        | Value::F32(_)
        | Value::F64(_)
        | Value::Guid(_)
        | Value::DateTime(_) => Ok(Value::String(value.to_string())),
        _ => strict_cast(value, ValueType::String),
    }
}

fn convert_to_guid(value: Value) -> RowbindResult<Value> {
    match &value {
        Value::String(s) => Ok(Value::Guid(s.trim().parse::<Uuid>()?)),
        _ => strict_cast(value, ValueType::Guid),
    }
}

fn convert_to_date_time(value: Value) -> RowbindResult<Value> {
    match &value {
        Value::String(s) => Ok(Value::DateTime(parse_date_time(s.trim())?)),
        _ => strict_cast(value, ValueType::DateTime),
    }
}

/// Parses a date/time from either the ISO `T`-separated form or the
/// space-separated form produced by [Value]'s display.
pub fn parse_date_time(text: &str) -> RowbindResult<NaiveDateTime> {
    if let Ok(parsed) = text.parse::<NaiveDateTime>() {
        return Ok(parsed);
    }
    Ok(NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")?)
}
