use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::common::{ConversionPolicy, Value, ValueType};
use crate::compiler::cache;
use crate::compiler::row_to_record::ConvertStep;
use crate::db::{
    resolve_db_type, DbCommand, DbField, DbTypeCode, ParameterDirection, TypeMapper,
};
use crate::errors::{ErrorKind, RowbindError, RowbindResult};
use crate::handler::{PropertyHandler, PropertyHandlerRegistry};
use crate::meta::{record_type_info, AttributeInfo, Record};

/// Batched parameter naming: the 0-th slot carries the bare field name,
/// later slots append `_i`. The suffix is load-bearing for the SQL
/// templating that consumes batched commands.
pub(crate) fn parameter_name(base: &str, slot: usize) -> String {
    if slot == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, slot)
    }
}

/// Where a parameter's value comes from.
#[derive(Clone, Debug)]
enum AttrSource {
    /// Bound at compile time to a statically-typed attribute.
    Static(AttributeInfo),
    /// Resolved by name at call time (dynamic records).
    Runtime(String),
}

#[derive(Debug)]
struct ParamBinding {
    field: DbField,
    source: AttrSource,
    convert: ConvertStep,
    handler: Option<PropertyHandler>,
    db_type: Option<DbTypeCode>,
    omit_db_type: bool,
    guard_null: bool,
    direction: ParameterDirection,
}

/// The effective type used for parameter type resolution.
///
/// Under Automatic, the attribute's underlying type wins whenever one of
/// the known coercions applies between it and the field type; otherwise
/// the field's declared type is used, falling back to the attribute type
/// when the field type is statically unknown.
fn effective_value_type(
    policy: ConversionPolicy,
    attribute_type: Option<ValueType>,
    field_type: ValueType,
) -> ValueType {
    if policy == ConversionPolicy::Automatic {
        if let Some(attribute_type) = attribute_type {
            if is_known_coercion(attribute_type, field_type) {
                return attribute_type;
            }
        }
    }
    if field_type != ValueType::Object {
        field_type
    } else {
        attribute_type.unwrap_or(ValueType::Object)
    }
}

fn is_known_coercion(attribute_type: ValueType, field_type: ValueType) -> bool {
    use ValueType::*;
    matches!(
        (attribute_type, field_type),
        (DateTime, String)
            | (String, DateTime)
            | (F64, F32)
            | (F32, F64)
            | (F64, I64)
            | (F64, I32)
            | (F64, I16)
            | (I64, F64)
            | (I32, F64)
            | (I16, F64)
            | (F32, I64)
            | (F32, I16)
            | (I64, F32)
            | (I16, F32)
            | (Guid, String)
            | (String, Guid)
    )
}

fn build_binding<T: Record>(
    dynamic: bool,
    field: &DbField,
    policy: ConversionPolicy,
    direction: ParameterDirection,
) -> RowbindResult<ParamBinding> {
    let registry = PropertyHandlerRegistry::global();

    let (source, attribute_type, handler) = if dynamic {
        (AttrSource::Runtime(field.name().to_string()), None, None)
    } else {
        let info = record_type_info::<T>()?;
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
        let handler = registry
            .lookup_attribute::<T>(attribute.name())
            .or_else(|| registry.lookup::<T>());
        (
            AttrSource::Static(attribute.clone()),
            Some(attribute.value_type()),
            handler,
        )
    };

    // the only build-time value coercion: a string attribute feeding a
    // guid field constructs the guid at runtime under Automatic
    let convert = if policy == ConversionPolicy::Automatic
        && attribute_type == Some(ValueType::String)
        && field.field_type() == ValueType::Guid
    {
        ConvertStep::StringToGuid
    } else {
        ConvertStep::None
    };

    let guard_null = dynamic
        || attribute_type.is_none()
        || matches!(&source, AttrSource::Static(attr) if attr.is_nullable() || !attr.value_type().is_value_type());

    let effective = effective_value_type(policy, attribute_type, field.field_type());
    let db_type = TypeMapper::get(effective).or_else(|| resolve_db_type(effective));
    // the fixed-interval type deliberately carries no explicit code so the
    // driver infers it
    let omit_db_type = effective == ValueType::Duration;

    Ok(ParamBinding {
        field: field.clone(),
        source,
        convert,
        handler,
        db_type,
        omit_db_type,
        guard_null,
        direction,
    })
}

fn emit_parameter<T: Record>(
    binding: &ParamBinding,
    record: &T,
    command: &mut dyn DbCommand,
    slot: usize,
) -> RowbindResult<()> {
    let mut parameter = command.create_parameter();
    parameter.set_name(&parameter_name(binding.field.name(), slot));

    if binding.direction == ParameterDirection::Input {
        let raw = match &binding.source {
            AttrSource::Static(attribute) => record
                .read_attribute(attribute.name())
                .unwrap_or(Value::Null),
            AttrSource::Runtime(name) => record.read_attribute(name).unwrap_or(Value::Null),
        };
        let transformed = match (&binding.handler, &binding.source) {
            (Some(handler), AttrSource::Static(attribute)) => handler.set(raw, attribute)?,
            _ => raw,
        };
        let converted = binding.convert.apply(transformed)?;
        // nullable and dynamically-resolved sources substitute the
        // database null sentinel for the runtime null
        let value = if binding.guard_null && converted.is_null() {
            Value::Null
        } else {
            converted
        };
        parameter.set_value(value);
    }

    parameter.set_direction(binding.direction);
    if !binding.omit_db_type {
        if let Some(code) = binding.db_type {
            parameter.set_db_type(code);
        }
    }
    // the image vendor type never carries a size; drivers truncate binary
    // payloads otherwise
    if !binding.field.has_provider_type("image") {
        if let Some(size) = binding.field.size() {
            parameter.set_size(size);
        }
    }
    if let Some(precision) = binding.field.precision() {
        parameter.set_precision(precision);
    }
    if let Some(scale) = binding.field.scale() {
        parameter.set_scale(scale);
    }

    command.parameters_mut().add(parameter);
    Ok(())
}

fn fields_fingerprint(
    kind: &str,
    inputs: &[DbField],
    outputs: &[DbField],
    batch_size: usize,
    policy: ConversionPolicy,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    inputs.hash(&mut hasher);
    outputs.hash(&mut hasher);
    batch_size.hash(&mut hasher);
    policy.hash(&mut hasher);
    hasher.finish()
}

/// Compiled record → command-parameters accessor (single record).
///
/// # Purpose
/// Fills a command's parameter collection from one record: one input
/// parameter per field, in field order, with the attribute bound at
/// compile time for statically-typed records and resolved by name at call
/// time for dynamic ones.
///
/// # Behavior
/// - The parameter collection is cleared once per invocation.
/// - A field with no matching attribute fails compilation: an explicit
///   field list is binding.
/// - Parameter type codes resolve through the type-mapper override, then
///   the static resolver, over the policy's effective type; the
///   fixed-interval type carries no code.
pub struct ParameterBinder<T> {
    bindings: Vec<ParamBinding>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for ParameterBinder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterBinder")
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<T: Record> ParameterBinder<T> {
    /// Compiles (or fetches from the accessor cache) the binder for the
    /// input field list.
    pub fn compile(input_fields: &[DbField]) -> RowbindResult<Arc<ParameterBinder<T>>> {
        let policy = crate::conversion_policy();
        let fingerprint = fields_fingerprint("record_to_params", input_fields, &[], 1, policy);
        cache::get_or_build(TypeId::of::<T>(), fingerprint, || {
            Self::build(input_fields, policy)
        })
    }

    pub(crate) fn build(
        input_fields: &[DbField],
        policy: ConversionPolicy,
    ) -> RowbindResult<ParameterBinder<T>> {
        let dynamic = record_type_info::<T>()?.is_dynamic();
        let bindings = input_fields
            .iter()
            .map(|field| build_binding::<T>(dynamic, field, policy, ParameterDirection::Input))
            .collect::<RowbindResult<Vec<_>>>()?;
        Ok(ParameterBinder {
            bindings,
            _marker: PhantomData,
        })
    }

    /// Fills the command's parameters from the record.
    pub fn bind(&self, record: &T, command: &mut dyn DbCommand) -> RowbindResult<()> {
        command.parameters_mut().clear();
        for binding in &self.bindings {
            emit_parameter(binding, record, command, 0)?;
        }
        Ok(())
    }
}

/// Compiled record-batch → command-parameters accessor.
///
/// # Purpose
/// Fills a command's parameter collection from an ordered batch of
/// records: the input parameters for every slot `i` in `[0, B)` in field
/// order, followed by the output parameters for every slot, all named
/// with the batched suffix rule.
///
/// # Behavior
/// - Exactly `B` slots are processed; a batch with fewer records is a
///   caller error and panics on indexing, by design.
/// - Output parameters skip the value assignment and are
///   `Output`-directed; sizing, precision/scale and type-code rules match
///   the input path.
pub struct BatchParameterBinder<T> {
    batch_size: usize,
    inputs: Vec<ParamBinding>,
    outputs: Vec<ParamBinding>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for BatchParameterBinder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchParameterBinder")
            .field("batch_size", &self.batch_size)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

impl<T: Record> BatchParameterBinder<T> {
    /// Compiles (or fetches from the accessor cache) the batched binder.
    ///
    /// # Errors
    /// `ErrorKind::Validation` when `batch_size` is zero.
    pub fn compile(
        input_fields: &[DbField],
        output_fields: &[DbField],
        batch_size: usize,
    ) -> RowbindResult<Arc<BatchParameterBinder<T>>> {
        let policy = crate::conversion_policy();
        let fingerprint = fields_fingerprint(
            "batch_to_params",
            input_fields,
            output_fields,
            batch_size,
            policy,
        );
        cache::get_or_build(TypeId::of::<T>(), fingerprint, || {
            Self::build(input_fields, output_fields, batch_size, policy)
        })
    }

    pub(crate) fn build(
        input_fields: &[DbField],
        output_fields: &[DbField],
        batch_size: usize,
        policy: ConversionPolicy,
    ) -> RowbindResult<BatchParameterBinder<T>> {
        if batch_size == 0 {
            log::error!("Batch size must be at least 1");
            return Err(RowbindError::new(
                "Batch size must be at least 1",
                ErrorKind::Validation,
            ));
        }
        let dynamic = record_type_info::<T>()?.is_dynamic();
        let inputs = input_fields
            .iter()
            .map(|field| build_binding::<T>(dynamic, field, policy, ParameterDirection::Input))
            .collect::<RowbindResult<Vec<_>>>()?;
        let outputs = output_fields
            .iter()
            .map(|field| build_binding::<T>(dynamic, field, policy, ParameterDirection::Output))
            .collect::<RowbindResult<Vec<_>>>()?;
        Ok(BatchParameterBinder {
            batch_size,
            inputs,
            outputs,
            _marker: PhantomData,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fills the command's parameters from exactly `batch_size` records.
    pub fn bind(&self, records: &[T], command: &mut dyn DbCommand) -> RowbindResult<()> {
        command.parameters_mut().clear();
        for slot in 0..self.batch_size {
            let record = &records[slot];
            for binding in &self.inputs {
                emit_parameter(binding, record, command, slot)?;
            }
        }
        for slot in 0..self.batch_size {
            let record = &records[slot];
            for binding in &self.outputs {
                emit_parameter(binding, record, command, slot)?;
            }
        }
        Ok(())
    }
}
