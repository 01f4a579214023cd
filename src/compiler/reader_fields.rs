use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::common::{matching_name, ConversionPolicy, ValueType};
use crate::db::{DbField, RowReader};
use crate::errors::RowbindResult;

/// Snapshot of one cursor column taken at plan-build time.
///
/// Lifetime is a single emitter invocation: the snapshot drives attribute
/// matching, accessor choice and null-guard decisions, then only the
/// ordinals survive into the compiled plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReaderFieldDef {
    ordinal: usize,
    name: String,
    matching_name: String,
    field_type: ValueType,
    nullable: bool,
}

impl ReaderFieldDef {
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The column name exactly as the cursor returned it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercased name used for case-insensitive attribute matching.
    pub fn matching_name(&self) -> &str {
        &self.matching_name
    }

    pub fn field_type(&self) -> ValueType {
        self.field_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

/// Snapshots the cursor's schema into [ReaderFieldDef]s.
///
/// Per-column nullability comes from the caller-supplied table fields,
/// matched by lowercased name; columns without an entry default to
/// nullable.
pub fn snapshot_schema(
    reader: &dyn RowReader,
    table_fields: Option<&[DbField]>,
) -> RowbindResult<Vec<ReaderFieldDef>> {
    let mut fields = Vec::with_capacity(reader.field_count());
    for ordinal in 0..reader.field_count() {
        let name = reader.field_name(ordinal)?;
        let matching = matching_name(&name);
        let nullable = table_fields
            .and_then(|all| all.iter().find(|f| f.matching_name() == matching))
            .map(|f| f.is_nullable())
            .unwrap_or(true);
        fields.push(ReaderFieldDef {
            ordinal,
            matching_name: matching,
            name,
            field_type: reader.field_type(ordinal)?,
            nullable,
        });
    }
    Ok(fields)
}

/// Computes the shape fingerprint that, together with the record type,
/// keys the accessor cache.
pub(crate) fn shape_fingerprint(
    kind: &str,
    fields: &[ReaderFieldDef],
    policy: Option<ConversionPolicy>,
) -> u64 {
    let mut hasher = DefaultHasher::new();
    kind.hash(&mut hasher);
    fields.hash(&mut hasher);
    policy.hash(&mut hasher);
    hasher.finish()
}
