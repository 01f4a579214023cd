use std::marker::PhantomData;

use crate::common::{strict_cast, Value, ValueType};
use crate::compiler::record_to_params::parameter_name;
use crate::db::{DbCommand, DbField};
use crate::errors::{ErrorKind, RowbindError, RowbindResult};
use crate::meta::{record_type_info, Record};

fn resolve_attribute<T: Record>(field: &DbField) -> RowbindResult<(String, ValueType)> {
    let info = record_type_info::<T>()?;
    if info.is_dynamic() {
        return Ok((field.name().to_string(), ValueType::Object));
    }
    let Some(attribute) = info.find_by_matching_name(&field.matching_name()) else {
        log::error!(
            "No attribute of {} matches the field '{}'",
            info.type_name(),
            field.name()
        );
        return Err(RowbindError::new(
            &format!(
                "No attribute of {} matches the field '{}'",
                info.type_name(),
                field.name()
            ),
            ErrorKind::NoMatchedFields,
        ));
    };
    Ok((attribute.name().to_string(), attribute.value_type()))
}

/// Compiled parameter → attribute writer.
///
/// Reads the parameter named after the field (with the batched suffix for
/// slots past the first), casts its value to the attribute's underlying
/// type and assigns it. Used to propagate identity columns and other
/// output parameters back into records after execution.
pub struct OutputParameterWriter<T> {
    attribute_name: String,
    parameter_name: String,
    cast_type: ValueType,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for OutputParameterWriter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputParameterWriter")
            .field("attribute_name", &self.attribute_name)
            .field("parameter_name", &self.parameter_name)
            .field("cast_type", &self.cast_type)
            .finish()
    }
}

impl<T: Record> OutputParameterWriter<T> {
    /// Builds the writer for a field at a batch slot.
    pub fn compile(field: &DbField, slot: usize) -> RowbindResult<OutputParameterWriter<T>> {
        let (attribute_name, cast_type) = resolve_attribute::<T>(field)?;
        Ok(OutputParameterWriter {
            attribute_name,
            parameter_name: parameter_name(field.name(), slot),
            cast_type,
            _marker: PhantomData,
        })
    }

    /// Copies the parameter value into the record attribute.
    pub fn write(&self, record: &mut T, command: &dyn DbCommand) -> RowbindResult<()> {
        let Some(parameter) = command.parameters().get(&self.parameter_name) else {
            log::error!("The command has no parameter named '{}'", self.parameter_name);
            return Err(RowbindError::new(
                &format!("The command has no parameter named '{}'", self.parameter_name),
                ErrorKind::InvalidOperation,
            ));
        };
        let value = strict_cast(parameter.value().clone(), self.cast_type)?;
        record.write_attribute(&self.attribute_name, value)
    }
}

/// Compiled value → attribute writer.
///
/// Casts an arbitrary value to the field's declared type and assigns it to
/// the corresponding attribute. A general-purpose setter used outside the
/// command flow.
pub struct ValueWriter<T> {
    attribute_name: String,
    cast_type: ValueType,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> ValueWriter<T> {
    pub fn compile(field: &DbField) -> RowbindResult<ValueWriter<T>> {
        let (attribute_name, _) = resolve_attribute::<T>(field)?;
        Ok(ValueWriter {
            attribute_name,
            cast_type: field.field_type(),
            _marker: PhantomData,
        })
    }

    pub fn write(&self, record: &mut T, value: Value) -> RowbindResult<()> {
        let value = strict_cast(value, self.cast_type)?;
        record.write_attribute(&self.attribute_name, value)
    }
}
