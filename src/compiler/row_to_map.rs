use indexmap::IndexMap;
use std::any::TypeId;
use std::sync::Arc;

use crate::common::Value;
use crate::compiler::cache;
use crate::compiler::reader_fields::{shape_fingerprint, snapshot_schema, ReaderFieldDef};
use crate::compiler::row_to_record::ReadStep;
use crate::db::{DbField, RowReader};
use crate::errors::{ErrorKind, RowbindError, RowbindResult};
use crate::meta::DynamicRecord;

#[derive(Debug)]
struct ColumnBinding {
    name: String,
    ordinal: usize,
    read: ReadStep,
    null_guard: bool,
}

/// Compiled row → dictionary accessor.
///
/// # Purpose
/// Projects every column of a row into an ordered dictionary keyed by the
/// column name as the cursor returns it (casing preserved, unlike the
/// lowercased matching used for record binding). Attributes are not known
/// statically; the shape is the cursor schema itself.
///
/// # Behavior
/// - Each column reads through its typed accessor when one exists,
///   otherwise through the untyped accessor.
/// - Nullable columns short-circuit to a null entry without reading.
/// - A cursor exposing zero columns fails compilation.
#[derive(Debug)]
pub struct DynamicProjection {
    bindings: Vec<ColumnBinding>,
}

impl DynamicProjection {
    /// Compiles (or fetches from the accessor cache) the projection for
    /// the cursor's current shape.
    pub fn compile(
        reader: &dyn RowReader,
        table_fields: Option<&[DbField]>,
    ) -> RowbindResult<Arc<DynamicProjection>> {
        let schema = snapshot_schema(reader, table_fields)?;
        let fingerprint = shape_fingerprint("row_to_map", &schema, None);
        cache::get_or_build(TypeId::of::<DynamicProjection>(), fingerprint, || {
            Self::build(reader, &schema)
        })
    }

    pub(crate) fn build(
        reader: &dyn RowReader,
        schema: &[ReaderFieldDef],
    ) -> RowbindResult<DynamicProjection> {
        if schema.is_empty() {
            log::error!("The row schema exposes no columns");
            return Err(RowbindError::new(
                "The row schema exposes no columns",
                ErrorKind::NoMatchedFields,
            ));
        }

        let bindings = schema
            .iter()
            .map(|field| {
                let read = if reader.supports_typed(field.field_type()) {
                    ReadStep::Typed(field.field_type())
                } else {
                    ReadStep::Untyped
                };
                ColumnBinding {
                    name: field.name().to_string(),
                    ordinal: field.ordinal(),
                    read,
                    null_guard: field.is_nullable(),
                }
            })
            .collect();

        Ok(DynamicProjection { bindings })
    }

    /// Projects the cursor's current row into an ordered dictionary.
    pub fn map_row(&self, reader: &dyn RowReader) -> RowbindResult<IndexMap<String, Value>> {
        let mut row = IndexMap::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let value = if binding.null_guard && reader.is_null(binding.ordinal)? {
                Value::Null
            } else {
                match binding.read {
                    ReadStep::Typed(value_type) => {
                        reader.typed_value(binding.ordinal, value_type)?
                    }
                    ReadStep::Untyped => reader.value(binding.ordinal)?,
                }
            };
            row.insert(binding.name.clone(), value);
        }
        Ok(row)
    }

    /// Projects the cursor's current row into a [DynamicRecord].
    pub fn map_record(&self, reader: &dyn RowReader) -> RowbindResult<DynamicRecord> {
        Ok(DynamicRecord::from(self.map_row(reader)?))
    }
}
