use crate::common::{Value, ValueType};
use crate::errors::RowbindResult;

/// The row cursor interface consumed by the accessor emitter.
///
/// # Purpose
/// Abstracts the driver's forward-only row cursor. The emitter uses it
/// twice: once at plan-build time for schema discovery (`field_count`,
/// `field_name`, `field_type`, `supports_typed`), and then per row through
/// the compiled plan (`is_null`, `typed_value`, `value`).
///
/// # Typed accessors
/// Drivers expose per-source-type accessors of varying coverage.
/// `supports_typed` reports whether a typed accessor exists for a value
/// type; the emitter probes it at build time and emits either a typed read
/// or the untyped `value` fallback. `typed_value` must succeed for every
/// type `supports_typed` reports, and may coerce the stored representation
/// to the requested type the way a driver's typed getter would.
pub trait RowReader {
    /// Number of columns in the current result shape.
    fn field_count(&self) -> usize;

    /// Column name at the ordinal, exactly as the driver returns it.
    fn field_name(&self, ordinal: usize) -> RowbindResult<String>;

    /// Source value type of the column at the ordinal.
    fn field_type(&self, ordinal: usize) -> RowbindResult<ValueType>;

    /// Whether the column value in the current row is null.
    fn is_null(&self, ordinal: usize) -> RowbindResult<bool>;

    /// Untyped accessor; the result's static type is unknown to the plan.
    fn value(&self, ordinal: usize) -> RowbindResult<Value>;

    /// Whether a typed accessor exists for the value type.
    fn supports_typed(&self, _value_type: ValueType) -> bool {
        false
    }

    /// Typed accessor; the default implementation falls back to the
    /// untyped read.
    fn typed_value(&self, ordinal: usize, _value_type: ValueType) -> RowbindResult<Value> {
        self.value(ordinal)
    }
}
