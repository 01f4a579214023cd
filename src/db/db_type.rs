use dashmap::DashMap;
use std::sync::LazyLock;

use crate::common::ValueType;
use crate::errors::{ErrorKind, RowbindError, RowbindResult};

/// The database parameter type enumeration understood by drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub enum DbTypeCode {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    String,
    Binary,
    DateTime,
    Time,
    Guid,
    Object,
}

/// Maps a runtime value type to the database parameter type enumeration.
///
/// The mapping is deterministic and static; statically-unknown types
/// resolve to `None`, in which case the caller may consult a
/// [TypeMapper] override and otherwise creates the parameter without an
/// explicit type code.
pub fn resolve_db_type(value_type: ValueType) -> Option<DbTypeCode> {
    match value_type {
        ValueType::Bool => Some(DbTypeCode::Boolean),
        ValueType::I8 => Some(DbTypeCode::Byte),
        ValueType::I16 => Some(DbTypeCode::Int16),
        ValueType::I32 => Some(DbTypeCode::Int32),
        ValueType::I64 => Some(DbTypeCode::Int64),
        ValueType::F32 => Some(DbTypeCode::Single),
        ValueType::F64 => Some(DbTypeCode::Double),
        ValueType::String => Some(DbTypeCode::String),
        ValueType::Bytes => Some(DbTypeCode::Binary),
        ValueType::DateTime => Some(DbTypeCode::DateTime),
        ValueType::Duration => Some(DbTypeCode::Time),
        ValueType::Guid => Some(DbTypeCode::Guid),
        ValueType::Object => None,
    }
}

static TYPE_MAP_OVERRIDES: LazyLock<DashMap<ValueType, DbTypeCode>> = LazyLock::new(DashMap::new);

/// Process-wide override map from value types to database parameter type
/// codes, consulted before [resolve_db_type] during parameter emission.
///
/// Mirrors the registry contract: duplicate mappings are rejected unless
/// forced, removal is idempotent, and reads are safe under arbitrary
/// concurrency.
pub struct TypeMapper;

impl TypeMapper {
    /// Registers an override; fails with `ErrorKind::MappingExists` when
    /// the type already has one and `force` is not set.
    pub fn map(value_type: ValueType, db_type: DbTypeCode, force: bool) -> RowbindResult<()> {
        match TYPE_MAP_OVERRIDES.entry(value_type) {
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                if !force {
                    log::error!("A db type mapping already exists for {:?}", value_type);
                    return Err(RowbindError::new(
                        &format!("A db type mapping already exists for {:?}", value_type),
                        ErrorKind::MappingExists,
                    ));
                }
                entry.insert(db_type);
                Ok(())
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(db_type);
                Ok(())
            }
        }
    }

    pub fn get(value_type: ValueType) -> Option<DbTypeCode> {
        TYPE_MAP_OVERRIDES.get(&value_type).map(|entry| *entry)
    }

    /// Removes an override; absent keys are a no-op.
    pub fn unmap(value_type: ValueType) {
        TYPE_MAP_OVERRIDES.remove(&value_type);
    }

    pub fn clear() {
        TYPE_MAP_OVERRIDES.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_static_mapping() {
        assert_eq!(resolve_db_type(ValueType::Bool), Some(DbTypeCode::Boolean));
        assert_eq!(resolve_db_type(ValueType::I32), Some(DbTypeCode::Int32));
        assert_eq!(resolve_db_type(ValueType::I64), Some(DbTypeCode::Int64));
        assert_eq!(resolve_db_type(ValueType::F32), Some(DbTypeCode::Single));
        assert_eq!(resolve_db_type(ValueType::String), Some(DbTypeCode::String));
        assert_eq!(resolve_db_type(ValueType::Bytes), Some(DbTypeCode::Binary));
        assert_eq!(resolve_db_type(ValueType::Guid), Some(DbTypeCode::Guid));
        assert_eq!(resolve_db_type(ValueType::Duration), Some(DbTypeCode::Time));
    }

    #[test]
    fn test_resolver_unknown_is_none() {
        assert_eq!(resolve_db_type(ValueType::Object), None);
    }

    #[test]
    fn test_type_mapper_override_cycle() {
        // DateTime is not touched by other tests in this module
        TypeMapper::unmap(ValueType::DateTime);
        assert_eq!(TypeMapper::get(ValueType::DateTime), None);

        TypeMapper::map(ValueType::DateTime, DbTypeCode::String, false).unwrap();
        assert_eq!(TypeMapper::get(ValueType::DateTime), Some(DbTypeCode::String));

        let duplicate = TypeMapper::map(ValueType::DateTime, DbTypeCode::Object, false);
        assert!(duplicate.is_err());
        assert_eq!(duplicate.unwrap_err().kind(), &ErrorKind::MappingExists);

        TypeMapper::map(ValueType::DateTime, DbTypeCode::Object, true).unwrap();
        assert_eq!(TypeMapper::get(ValueType::DateTime), Some(DbTypeCode::Object));

        TypeMapper::unmap(ValueType::DateTime);
        assert_eq!(TypeMapper::get(ValueType::DateTime), None);
        // removing again is a no-op
        TypeMapper::unmap(ValueType::DateTime);
    }
}
