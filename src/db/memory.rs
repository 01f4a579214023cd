use std::collections::HashSet;

use crate::common::{auto_convert, Value, ValueType};
use crate::db::{DbCommand, ParameterCollection, RowReader};
use crate::errors::{ErrorKind, RowbindError, RowbindResult};

/// Column of a [MemoryReader]: name and declared source type.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryColumn {
    name: String,
    field_type: ValueType,
}

impl MemoryColumn {
    pub fn new(name: &str, field_type: ValueType) -> Self {
        MemoryColumn {
            name: name.to_string(),
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> ValueType {
        self.field_type
    }
}

/// An in-memory [RowReader] over a fixed schema and row set.
///
/// # Purpose
/// A complete cursor implementation for tests and for embedders that
/// simulate command execution. The cursor starts positioned before the
/// first row; advance it with [MemoryReader::next_row].
///
/// # Typed accessor coverage
/// By default every value type has a typed accessor. Use
/// [MemoryReader::with_typed_support] to restrict coverage or
/// [MemoryReader::without_typed_accessors] to force the untyped fallback
/// path, mirroring drivers with partial accessor sets.
#[derive(Clone, Debug)]
pub struct MemoryReader {
    columns: Vec<MemoryColumn>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
    typed_support: Option<HashSet<ValueType>>,
}

impl MemoryReader {
    pub fn new(columns: Vec<MemoryColumn>, rows: Vec<Vec<Value>>) -> Self {
        MemoryReader {
            columns,
            rows,
            position: None,
            typed_support: None,
        }
    }

    /// Restricts typed accessors to the given value types.
    pub fn with_typed_support(mut self, types: &[ValueType]) -> Self {
        self.typed_support = Some(types.iter().copied().collect());
        self
    }

    /// Removes all typed accessors; every read goes through the untyped
    /// fallback.
    pub fn without_typed_accessors(mut self) -> Self {
        self.typed_support = Some(HashSet::new());
        self
    }

    /// Advances to the next row; returns false when the cursor is
    /// exhausted.
    pub fn next_row(&mut self) -> bool {
        let next = match self.position {
            None => 0,
            Some(current) => current + 1,
        };
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    fn current_row(&self) -> RowbindResult<&Vec<Value>> {
        self.position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| {
                RowbindError::new(
                    "The reader is not positioned on a row",
                    ErrorKind::InvalidOperation,
                )
            })
    }

    fn check_ordinal(&self, ordinal: usize) -> RowbindResult<()> {
        if ordinal >= self.columns.len() {
            log::error!("Ordinal {} is out of range", ordinal);
            return Err(RowbindError::new(
                &format!("Ordinal {} is out of range", ordinal),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}

impl RowReader for MemoryReader {
    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn field_name(&self, ordinal: usize) -> RowbindResult<String> {
        self.check_ordinal(ordinal)?;
        Ok(self.columns[ordinal].name().to_string())
    }

    fn field_type(&self, ordinal: usize) -> RowbindResult<ValueType> {
        self.check_ordinal(ordinal)?;
        Ok(self.columns[ordinal].field_type())
    }

    fn is_null(&self, ordinal: usize) -> RowbindResult<bool> {
        self.check_ordinal(ordinal)?;
        Ok(self.current_row()?[ordinal].is_null())
    }

    fn value(&self, ordinal: usize) -> RowbindResult<Value> {
        self.check_ordinal(ordinal)?;
        Ok(self.current_row()?[ordinal].clone())
    }

    fn supports_typed(&self, value_type: ValueType) -> bool {
        match &self.typed_support {
            Some(types) => types.contains(&value_type),
            None => value_type != ValueType::Object,
        }
    }

    fn typed_value(&self, ordinal: usize, value_type: ValueType) -> RowbindResult<Value> {
        let raw = self.value(ordinal)?;
        if raw.is_null() || raw.value_type() == value_type {
            return Ok(raw);
        }
        // a typed driver getter coerces the stored representation
        auto_convert(raw, value_type)
    }
}

/// An in-memory [DbCommand] holding only its parameter collection.
#[derive(Clone, Debug, Default)]
pub struct MemoryCommand {
    parameters: ParameterCollection,
}

impl MemoryCommand {
    pub fn new() -> Self {
        MemoryCommand::default()
    }
}

impl DbCommand for MemoryCommand {
    fn parameters(&self) -> &ParameterCollection {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterCollection {
        &mut self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reader() -> MemoryReader {
        MemoryReader::new(
            vec![
                MemoryColumn::new("Id", ValueType::I32),
                MemoryColumn::new("Name", ValueType::String),
            ],
            vec![
                vec![Value::I32(1), Value::from("ada")],
                vec![Value::I32(2), Value::Null],
            ],
        )
    }

    #[test]
    fn test_schema_discovery() {
        let reader = sample_reader();
        assert_eq!(reader.field_count(), 2);
        assert_eq!(reader.field_name(0).unwrap(), "Id");
        assert_eq!(reader.field_type(1).unwrap(), ValueType::String);
        assert!(reader.field_name(2).is_err());
    }

    #[test]
    fn test_cursor_positioning() {
        let mut reader = sample_reader();
        // not positioned yet
        assert!(reader.value(0).is_err());
        assert!(reader.next_row());
        assert_eq!(reader.value(0).unwrap(), Value::I32(1));
        assert!(reader.next_row());
        assert!(reader.is_null(1).unwrap());
        assert!(!reader.next_row());
        assert!(reader.value(0).is_err());
    }

    #[test]
    fn test_typed_support_default_covers_all() {
        let reader = sample_reader();
        assert!(reader.supports_typed(ValueType::I32));
        assert!(reader.supports_typed(ValueType::Guid));
        assert!(!reader.supports_typed(ValueType::Object));
    }

    #[test]
    fn test_typed_support_restriction() {
        let reader = sample_reader().with_typed_support(&[ValueType::I32]);
        assert!(reader.supports_typed(ValueType::I32));
        assert!(!reader.supports_typed(ValueType::String));

        let bare = sample_reader().without_typed_accessors();
        assert!(!bare.supports_typed(ValueType::I32));
    }

    #[test]
    fn test_typed_value_coerces() {
        let mut reader = MemoryReader::new(
            vec![MemoryColumn::new("Age", ValueType::I64)],
            vec![vec![Value::I32(30)]],
        );
        reader.next_row();
        assert_eq!(reader.typed_value(0, ValueType::I64).unwrap(), Value::I64(30));
    }

    #[test]
    fn test_memory_command_parameters() {
        let mut command = MemoryCommand::new();
        assert!(command.parameters().is_empty());
        let mut parameter = command.create_parameter();
        parameter.set_name("Id");
        command.parameters_mut().add(parameter);
        assert_eq!(command.parameters().len(), 1);
    }
}
