use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::common::{auto_convert, strict_cast, ConversionPolicy, Value, ValueType};
use crate::compiler::cache;
use crate::compiler::reader_fields::{shape_fingerprint, snapshot_schema, ReaderFieldDef};
use crate::db::{DbField, RowReader};
use crate::errors::{ErrorKind, RowbindError, RowbindResult};
use crate::handler::{PropertyHandler, PropertyHandlerRegistry};
use crate::meta::{record_type_info, AttributeInfo, Record};

/// How a compiled plan reads one column from the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReadStep {
    /// Read through the typed accessor for the value type.
    Typed(ValueType),
    /// Read through the untyped accessor; the result's type is unknown.
    Untyped,
}

/// How a compiled plan converts a read value to the attribute type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConvertStep {
    /// No conversion; source and destination types agree.
    None,
    /// Direct cast to the target type (Strict policy, and the Automatic
    /// fallback when no conversion path exists).
    Cast(ValueType),
    /// Construct a guid from the string form.
    StringToGuid,
    /// Render a guid through its standard string conversion.
    GuidToString,
    /// Standard widening/narrowing conversion to the target type.
    Auto(ValueType),
}

impl ConvertStep {
    pub(crate) fn apply(&self, value: Value) -> RowbindResult<Value> {
        match self {
            ConvertStep::None => Ok(value),
            ConvertStep::Cast(target) => strict_cast(value, *target),
            ConvertStep::StringToGuid => match value {
                Value::Null => Ok(Value::Null),
                Value::String(s) => Ok(Value::Guid(s.trim().parse()?)),
                other => strict_cast(other, ValueType::Guid),
            },
            ConvertStep::GuidToString => match value {
                Value::Null => Ok(Value::Null),
                Value::Guid(g) => Ok(Value::String(g.to_string())),
                other => strict_cast(other, ValueType::String),
            },
            ConvertStep::Auto(target) => auto_convert(value, *target),
        }
    }
}

/// Chooses the reader accessor and the type the read expression carries.
///
/// Prefers the typed accessor for the column's source type; under Strict
/// falls back to the attribute-typed accessor when one exists (except for
/// single-precision floats, whose type-named accessors are unreliable and
/// are skipped); otherwise the untyped accessor is used and conversion is
/// forced.
pub(crate) fn choose_read_step(
    reader: &dyn RowReader,
    source: ValueType,
    target: ValueType,
    policy: ConversionPolicy,
) -> (ReadStep, ValueType) {
    if reader.supports_typed(source) {
        (ReadStep::Typed(source), source)
    } else if policy == ConversionPolicy::Strict
        && target != ValueType::F32
        && reader.supports_typed(target)
    {
        (ReadStep::Typed(target), target)
    } else {
        (ReadStep::Untyped, ValueType::Object)
    }
}

/// Decides the conversion step from the read expression's type to the
/// attribute type under the sampled policy.
pub(crate) fn choose_convert_step(
    convert_from: ValueType,
    target: ValueType,
    policy: ConversionPolicy,
) -> ConvertStep {
    if convert_from == target {
        return ConvertStep::None;
    }
    match policy {
        ConversionPolicy::Strict => ConvertStep::Cast(target),
        ConversionPolicy::Automatic => match (convert_from, target) {
            (ValueType::String, ValueType::Guid) => ConvertStep::StringToGuid,
            (ValueType::Guid, ValueType::String) => ConvertStep::GuidToString,
            _ => ConvertStep::Auto(target),
        },
    }
}

#[derive(Debug)]
struct AttributeBinding {
    attribute: AttributeInfo,
    ordinal: usize,
    read: ReadStep,
    convert: ConvertStep,
    null_guard: bool,
    null_default: Value,
    handler: Option<PropertyHandler>,
}

/// Compiled row → record accessor.
///
/// # Purpose
/// The hot-path projection of a row cursor into a populated record.
/// Built once per `(record type, shape)` via [RecordMapper::compile] and
/// cached; invocation performs no further metadata work.
///
/// # Behavior
/// - Attributes are matched to columns case-insensitively; unmatched
///   attributes are skipped silently, read-only attributes never bind.
/// - A nullable column is guarded: a null cell assigns the attribute's
///   default (the empty form for nullable attributes, the zero value
///   otherwise) without invoking any conversion or handler.
/// - A snapshotted property handler supersedes the built-in conversion
///   for its attribute and receives the raw column value.
pub struct RecordMapper<T> {
    bindings: Vec<AttributeBinding>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RecordMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMapper")
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<T: Record> RecordMapper<T> {
    /// Compiles (or fetches from the accessor cache) the mapper for the
    /// cursor's current shape.
    ///
    /// The reader is used only for schema discovery; `table_fields`
    /// supplies per-column nullability, defaulting to nullable for
    /// columns without an entry.
    pub fn compile(
        reader: &dyn RowReader,
        table_fields: Option<&[DbField]>,
    ) -> RowbindResult<Arc<RecordMapper<T>>> {
        let policy = crate::conversion_policy();
        let schema = snapshot_schema(reader, table_fields)?;
        let fingerprint = shape_fingerprint("row_to_record", &schema, Some(policy));
        cache::get_or_build(TypeId::of::<T>(), fingerprint, || {
            Self::build(reader, &schema, policy)
        })
    }

    pub(crate) fn build(
        reader: &dyn RowReader,
        schema: &[ReaderFieldDef],
        policy: ConversionPolicy,
    ) -> RowbindResult<RecordMapper<T>> {
        let info = record_type_info::<T>()?;
        let registry = PropertyHandlerRegistry::global();
        let mut bindings = Vec::new();

        for attribute in info.attributes() {
            if !attribute.is_writable() {
                continue;
            }
            let Some(field) = schema
                .iter()
                .find(|f| f.matching_name() == attribute.matching_name())
            else {
                continue;
            };

            let target = attribute.value_type();
            let (read, convert_from) =
                choose_read_step(reader, field.field_type(), target, policy);
            let convert = choose_convert_step(convert_from, target, policy);
            let null_default = if attribute.is_nullable() {
                Value::Null
            } else {
                target.default_value()
            };
            let handler = registry
                .lookup_attribute::<T>(attribute.name())
                .or_else(|| registry.lookup::<T>());

            bindings.push(AttributeBinding {
                attribute: attribute.clone(),
                ordinal: field.ordinal(),
                read,
                convert,
                null_guard: field.is_nullable(),
                null_default,
                handler,
            });
        }

        if bindings.is_empty() {
            log::error!(
                "No attribute of {} matches any column of the row schema",
                info.type_name()
            );
            return Err(RowbindError::new(
                &format!(
                    "No attribute of {} matches any column of the row schema",
                    info.type_name()
                ),
                ErrorKind::NoMatchedFields,
            ));
        }

        Ok(RecordMapper {
            bindings,
            _marker: PhantomData,
        })
    }

    /// Projects the cursor's current row into a populated record.
    pub fn map_row(&self, reader: &dyn RowReader) -> RowbindResult<T> {
        let mut record = T::default();
        for binding in &self.bindings {
            let value = if binding.null_guard && reader.is_null(binding.ordinal)? {
                binding.null_default.clone()
            } else {
                let raw = match binding.read {
                    ReadStep::Typed(value_type) => reader.typed_value(binding.ordinal, value_type)?,
                    ReadStep::Untyped => reader.value(binding.ordinal)?,
                };
                match &binding.handler {
                    Some(handler) => handler.get(raw, &binding.attribute)?,
                    None => binding.convert.apply(raw)?,
                }
            };
            record.write_attribute(binding.attribute.name(), value)?;
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryColumn, MemoryReader};
    use crate::handler::PropertyHandlerProvider;
    use crate::meta::{AttributeDescriptor, RecordDescriptor};

    #[derive(Debug, Default, PartialEq)]
    struct Customer {
        id: i32,
        name: String,
        dob: Option<chrono::NaiveDateTime>,
    }

    impl Record for Customer {
        fn descriptor() -> RecordDescriptor {
            RecordDescriptor::new("Customer")
                .with_attribute(AttributeDescriptor::new("id", ValueType::I32).with_column("Id"))
                .with_attribute(
                    AttributeDescriptor::new("name", ValueType::String).with_column("Name"),
                )
                .with_attribute(
                    AttributeDescriptor::new("dob", ValueType::DateTime)
                        .with_column("DOB")
                        .nullable(),
                )
        }

        fn read_attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.clone().into()),
                "dob" => Some(self.dob.into()),
                _ => None,
            }
        }

        fn write_attribute(&mut self, name: &str, value: Value) -> RowbindResult<()> {
            match name {
                "id" => self.id = value.as_i32().unwrap_or_default(),
                "name" => self.name = value.as_string().unwrap_or_default().to_string(),
                "dob" => self.dob = value.as_date_time(),
                _ => {}
            }
            Ok(())
        }
    }

    fn customer_reader() -> MemoryReader {
        MemoryReader::new(
            vec![
                MemoryColumn::new("Id", ValueType::I32),
                MemoryColumn::new("Name", ValueType::String),
                MemoryColumn::new("Age", ValueType::I32),
            ],
            vec![vec![Value::I32(7), Value::from("ada"), Value::I32(30)]],
        )
    }

    #[test]
    fn test_unmatched_column_is_skipped_silently() {
        let mut reader = customer_reader();
        let schema = snapshot_schema(&reader, None).unwrap();
        let mapper =
            RecordMapper::<Customer>::build(&reader, &schema, ConversionPolicy::Strict).unwrap();
        reader.next_row();
        let record = mapper.map_row(&reader).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.name, "ada");
        assert_eq!(record.dob, None);
    }

    #[test]
    fn test_no_matched_fields_is_fatal() {
        #[derive(Default)]
        struct Unrelated {
            other: i64,
        }

        impl Record for Unrelated {
            fn descriptor() -> RecordDescriptor {
                RecordDescriptor::new("Unrelated")
                    .with_attribute(AttributeDescriptor::new("other", ValueType::I64))
            }

            fn read_attribute(&self, _name: &str) -> Option<Value> {
                Some(self.other.into())
            }

            fn write_attribute(&mut self, _name: &str, value: Value) -> RowbindResult<()> {
                self.other = value.as_i64().unwrap_or_default();
                Ok(())
            }
        }

        let reader = MemoryReader::new(
            vec![MemoryColumn::new("X", ValueType::I32)],
            vec![vec![Value::I32(1)]],
        );
        let schema = snapshot_schema(&reader, None).unwrap();
        let result = RecordMapper::<Unrelated>::build(&reader, &schema, ConversionPolicy::Strict);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::NoMatchedFields);
    }

    #[test]
    fn test_null_column_assigns_default_without_conversion() {
        // the DOB column is a string; a conversion under Strict would fail,
        // proving the null guard short-circuits before any conversion
        let mut reader = MemoryReader::new(
            vec![
                MemoryColumn::new("Id", ValueType::I32),
                MemoryColumn::new("DOB", ValueType::String),
            ],
            vec![vec![Value::I32(1), Value::Null]],
        );
        let table = vec![
            DbField::new("Id", ValueType::I32, false),
            DbField::new("DOB", ValueType::String, true),
        ];
        let schema = snapshot_schema(&reader, Some(&table)).unwrap();
        let mapper =
            RecordMapper::<Customer>::build(&reader, &schema, ConversionPolicy::Strict).unwrap();
        reader.next_row();
        let record = mapper.map_row(&reader).unwrap();
        assert_eq!(record.dob, None);
    }

    #[test]
    fn test_non_nullable_column_null_default_is_zero_form() {
        #[derive(Default)]
        struct Counted {
            total: i32,
        }

        impl Record for Counted {
            fn descriptor() -> RecordDescriptor {
                RecordDescriptor::new("Counted")
                    .with_attribute(AttributeDescriptor::new("total", ValueType::I32))
            }

            fn read_attribute(&self, _name: &str) -> Option<Value> {
                Some(self.total.into())
            }

            fn write_attribute(&mut self, _name: &str, value: Value) -> RowbindResult<()> {
                self.total = value.as_i32().unwrap_or(-1);
                Ok(())
            }
        }

        let mut reader = MemoryReader::new(
            vec![MemoryColumn::new("Total", ValueType::I32)],
            vec![vec![Value::Null]],
        );
        let schema = snapshot_schema(&reader, None).unwrap();
        let mapper =
            RecordMapper::<Counted>::build(&reader, &schema, ConversionPolicy::Strict).unwrap();
        reader.next_row();
        // non-nullable attribute receives the zero form, not Null
        let record = mapper.map_row(&reader).unwrap();
        assert_eq!(record.total, 0);
    }

    #[test]
    fn test_automatic_converts_across_types() {
        #[derive(Default)]
        struct Wide {
            id: i64,
        }

        impl Record for Wide {
            fn descriptor() -> RecordDescriptor {
                RecordDescriptor::new("Wide")
                    .with_attribute(AttributeDescriptor::new("id", ValueType::I64).with_column("Id"))
            }

            fn read_attribute(&self, _name: &str) -> Option<Value> {
                Some(self.id.into())
            }

            fn write_attribute(&mut self, _name: &str, value: Value) -> RowbindResult<()> {
                self.id = value.as_i64().unwrap_or_default();
                Ok(())
            }
        }

        // force the untyped path so the conversion step must run
        let mut reader = MemoryReader::new(
            vec![MemoryColumn::new("Id", ValueType::I32)],
            vec![vec![Value::I32(7)]],
        )
        .without_typed_accessors();
        let schema = snapshot_schema(&reader, None).unwrap();
        let mapper =
            RecordMapper::<Wide>::build(&reader, &schema, ConversionPolicy::Automatic).unwrap();
        reader.next_row();
        assert_eq!(mapper.map_row(&reader).unwrap().id, 7);
    }

    #[test]
    fn test_strict_mismatch_surfaces_at_invocation() {
        #[derive(Debug, Default)]
        struct Narrow {
            id: i64,
        }

        impl Record for Narrow {
            fn descriptor() -> RecordDescriptor {
                RecordDescriptor::new("Narrow")
                    .with_attribute(AttributeDescriptor::new("id", ValueType::I64).with_column("Id"))
            }

            fn read_attribute(&self, _name: &str) -> Option<Value> {
                Some(self.id.into())
            }

            fn write_attribute(&mut self, _name: &str, value: Value) -> RowbindResult<()> {
                self.id = value.as_i64().unwrap_or_default();
                Ok(())
            }
        }

        let mut reader = MemoryReader::new(
            vec![MemoryColumn::new("Id", ValueType::I32)],
            vec![vec![Value::I32(7)]],
        )
        .without_typed_accessors();
        let schema = snapshot_schema(&reader, None).unwrap();
        let mapper =
            RecordMapper::<Narrow>::build(&reader, &schema, ConversionPolicy::Strict).unwrap();
        reader.next_row();
        let result = mapper.map_row(&reader);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Conversion);
    }

    #[test]
    fn test_float_property_typed_accessor_is_skipped_under_strict() {
        let reader = MemoryReader::new(
            vec![MemoryColumn::new("Ratio", ValueType::F64)],
            vec![vec![Value::F64(0.5)]],
        )
        .with_typed_support(&[ValueType::F32]);

        // source accessor missing, property-typed accessor exists but the
        // target is a single-precision float: fall through to untyped
        let (read, convert_from) = choose_read_step(
            &reader,
            ValueType::F64,
            ValueType::F32,
            ConversionPolicy::Strict,
        );
        assert_eq!(read, ReadStep::Untyped);
        assert_eq!(convert_from, ValueType::Object);

        // any other target happily uses the property-typed accessor
        let reader = reader.with_typed_support(&[ValueType::I64]);
        let (read, convert_from) = choose_read_step(
            &reader,
            ValueType::F64,
            ValueType::I64,
            ConversionPolicy::Strict,
        );
        assert_eq!(read, ReadStep::Typed(ValueType::I64));
        assert_eq!(convert_from, ValueType::I64);
    }

    #[test]
    fn test_property_typed_accessor_not_used_under_automatic() {
        let reader = MemoryReader::new(
            vec![MemoryColumn::new("Id", ValueType::I32)],
            vec![vec![Value::I32(1)]],
        )
        .with_typed_support(&[ValueType::I64]);
        let (read, _) = choose_read_step(
            &reader,
            ValueType::I32,
            ValueType::I64,
            ConversionPolicy::Automatic,
        );
        assert_eq!(read, ReadStep::Untyped);
    }

    #[test]
    fn test_handler_supersedes_conversion() {
        #[derive(Default)]
        struct Handled {
            name: String,
        }

        impl Record for Handled {
            fn descriptor() -> RecordDescriptor {
                RecordDescriptor::new("Handled").with_attribute(
                    AttributeDescriptor::new("name", ValueType::String).with_column("Name"),
                )
            }

            fn read_attribute(&self, _name: &str) -> Option<Value> {
                Some(self.name.clone().into())
            }

            fn write_attribute(&mut self, _name: &str, value: Value) -> RowbindResult<()> {
                self.name = value.as_string().unwrap_or_default().to_string();
                Ok(())
            }
        }

        struct Suffixing;

        impl PropertyHandlerProvider for Suffixing {
            fn get(&self, value: Value, _attribute: &AttributeInfo) -> RowbindResult<Value> {
                Ok(Value::String(format!("{}!", value)))
            }

            fn set(&self, value: Value, _attribute: &AttributeInfo) -> RowbindResult<Value> {
                Ok(value)
            }
        }

        PropertyHandlerRegistry::global()
            .register_attribute::<Handled, str>("name", PropertyHandler::new(Suffixing), true)
            .unwrap();

        let mut reader = MemoryReader::new(
            vec![MemoryColumn::new("Name", ValueType::String)],
            vec![vec![Value::from("ada")]],
        );
        let schema = snapshot_schema(&reader, None).unwrap();
        let mapper =
            RecordMapper::<Handled>::build(&reader, &schema, ConversionPolicy::Strict).unwrap();
        reader.next_row();
        assert_eq!(mapper.map_row(&reader).unwrap().name, "ada!");

        // plans snapshot the handler: removing it does not affect the
        // already-compiled mapper
        PropertyHandlerRegistry::global().remove_attribute::<Handled>("name");
        assert_eq!(mapper.map_row(&reader).unwrap().name, "ada!");
    }

    #[test]
    fn test_compile_is_cached_per_shape() {
        let reader = customer_reader();
        let first = RecordMapper::<Customer>::compile(&reader, None).unwrap();
        let second = RecordMapper::<Customer>::compile(&reader, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
