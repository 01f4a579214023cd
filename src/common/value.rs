use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

/// Represents a database-facing value moving between row cursors, record
/// attributes and command parameters.
///
/// # Purpose
/// Provides a unified representation for every value type the mapping core
/// moves around: the primitive SQL-facing types (integers, floats,
/// booleans, strings, binary), plus guids, date/times and fixed intervals.
///
/// # Characteristics
/// - **Null-carrying**: [Value::Null] is both the empty form of a nullable
///   attribute and the database null sentinel on parameters
/// - **Typed**: every variant maps to exactly one [ValueType] code
/// - **Serializable**: can be serialized/deserialized with serde
/// - **Default**: defaults to Null
///
/// # Usage
/// Create values using the `From` implementations:
/// ```text
/// let v1: Value = 42i32.into();
/// let v2 = Value::from("hello");
/// ```
///
/// Access values using the `as_*` methods (returns `Option` if the variant
/// matches):
/// ```text
/// if let Some(age) = row_value.as_i32() {
///     println!("Age: {}", age);
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents a signed 8-bit integer value.
    I8(i8),
    /// Represents a signed 16-bit integer value.
    I16(i16),
    /// Represents a signed 32-bit integer value.
    I32(i32),
    /// Represents a signed 64-bit integer value.
    I64(i64),
    /// Represents a 32-bit floating point value.
    F32(f32),
    /// Represents a 64-bit floating point value.
    F64(f64),
    /// Represents a string value.
    String(String),
    /// Represents a byte array value.
    Bytes(Vec<u8>),
    /// Represents a globally unique identifier.
    Guid(Uuid),
    /// Represents a date/time value without timezone.
    DateTime(NaiveDateTime),
    /// Represents a fixed time interval.
    Duration(Duration),
}

/// Type codes for [Value] variants plus the statically-unknown `Object`.
///
/// `Object` is produced when a value's type is not known at plan-build
/// time, e.g. when a column is read through the untyped cursor accessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub enum ValueType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Bytes,
    Guid,
    DateTime,
    Duration,
    /// Statically unknown; conversion is always forced from this type.
    Object,
}

impl Value {
    /// Returns the [ValueType] code of this value.
    ///
    /// `Null` carries no type information and reports [ValueType::Object].
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Object,
            Value::Bool(_) => ValueType::Bool,
            Value::I8(_) => ValueType::I8,
            Value::I16(_) => ValueType::I16,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::String(_) => ValueType::String,
            Value::Bytes(_) => ValueType::Bytes,
            Value::Guid(_) => ValueType::Guid,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Duration(_) => ValueType::Duration,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Value::I8(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::I16(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }
}

impl ValueType {
    /// Returns the zero/default value of this type.
    ///
    /// Used by null guards for non-nullable attributes; `Object` has no
    /// zero form and yields `Null`.
    pub fn default_value(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::I8 => Value::I8(0),
            ValueType::I16 => Value::I16(0),
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F32 => Value::F32(0.0),
            ValueType::F64 => Value::F64(0.0),
            ValueType::String => Value::String(String::new()),
            ValueType::Bytes => Value::Bytes(Vec::new()),
            ValueType::Guid => Value::Guid(Uuid::nil()),
            ValueType::DateTime => Value::DateTime(NaiveDateTime::default()),
            ValueType::Duration => Value::Duration(Duration::ZERO),
            ValueType::Object => Value::Null,
        }
    }

    /// Returns true when the type has value (copy) semantics, i.e. it is
    /// not a string, binary or statically-unknown type.
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self,
            ValueType::String | ValueType::Bytes | ValueType::Object
        )
    }

    /// Returns true for the integer and float family.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::I8
                | ValueType::I16
                | ValueType::I32
                | ValueType::I64
                | ValueType::F32
                | ValueType::F64
        )
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I8(i) => write!(f, "{}", i),
            Value::I16(i) => write!(f, "{}", i),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{} bytes", b.len()),
            Value::Guid(g) => write!(f, "{}", g),
            Value::DateTime(d) => write!(f, "{}", d),
            Value::Duration(d) => write!(f, "{:?}", d),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_codes() {
        assert_eq!(Value::Bool(true).value_type(), ValueType::Bool);
        assert_eq!(Value::I32(1).value_type(), ValueType::I32);
        assert_eq!(Value::F64(1.5).value_type(), ValueType::F64);
        assert_eq!(Value::from("x").value_type(), ValueType::String);
        assert_eq!(Value::Guid(Uuid::nil()).value_type(), ValueType::Guid);
        assert_eq!(Value::Null.value_type(), ValueType::Object);
    }

    #[test]
    fn test_default_is_null() {
        assert_eq!(Value::default(), Value::Null);
        assert!(Value::default().is_null());
    }

    #[test]
    fn test_as_accessors_match_variant() {
        assert_eq!(Value::I32(7).as_i32(), Some(7));
        assert_eq!(Value::I32(7).as_i64(), None);
        assert_eq!(Value::from("ada").as_string(), Some("ada"));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::F64(2.5).as_f64(), Some(2.5));
    }

    #[test]
    fn test_default_value_zero_forms() {
        assert_eq!(ValueType::I32.default_value(), Value::I32(0));
        assert_eq!(ValueType::Bool.default_value(), Value::Bool(false));
        assert_eq!(ValueType::String.default_value(), Value::String(String::new()));
        assert_eq!(ValueType::Guid.default_value(), Value::Guid(Uuid::nil()));
        assert_eq!(ValueType::Object.default_value(), Value::Null);
    }

    #[test]
    fn test_is_value_type() {
        assert!(ValueType::I32.is_value_type());
        assert!(ValueType::Guid.is_value_type());
        assert!(ValueType::DateTime.is_value_type());
        assert!(!ValueType::String.is_value_type());
        assert!(!ValueType::Bytes.is_value_type());
        assert!(!ValueType::Object.is_value_type());
    }

    #[test]
    fn test_is_numeric() {
        assert!(ValueType::I8.is_numeric());
        assert!(ValueType::F32.is_numeric());
        assert!(!ValueType::Bool.is_numeric());
        assert!(!ValueType::String.is_numeric());
    }

    #[test]
    fn test_from_option() {
        let some: Value = Some(5i32).into();
        let none: Value = Option::<i32>::None.into();
        assert_eq!(some, Value::I32(5));
        assert_eq!(none, Value::Null);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::I64(42).to_string(), "42");
        assert_eq!(Value::from("ada").to_string(), "ada");
    }
}
