use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::errors::{ErrorKind, RowbindError, RowbindResult};
use crate::meta::{AttributeInfo, Record};

/// Canonical metadata about a record type: its attributes, mapped table
/// name and dynamic flag.
///
/// # Purpose
/// The process-wide unit of the type & property cache. Built on first
/// demand per type via [record_type_info], immutable afterwards, and
/// shared by every accessor plan compiled for the type.
///
/// # Characteristics
/// - **Immutable**: attribute list and names never change after build
/// - **Shared**: held behind `Arc` in a process-wide cache
/// - **Owned attributes**: the info exclusively owns its `AttributeInfo`
///   list
#[derive(Clone, Debug)]
pub struct RecordTypeInfo {
    type_id: TypeId,
    type_name: String,
    table_name: String,
    attributes: Vec<AttributeInfo>,
    dynamic: bool,
}

impl RecordTypeInfo {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The mapped table name: the descriptor override or the type name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Finds an attribute by its lowercased mapped column name.
    pub fn find_by_matching_name(&self, matching_name: &str) -> Option<&AttributeInfo> {
        self.attributes
            .iter()
            .find(|attr| attr.matching_name() == matching_name)
    }

    /// Finds an attribute by its canonical (case-sensitive) name.
    pub fn find_by_name(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|attr| attr.name() == name)
    }
}

static RECORD_INFO_CACHE: LazyLock<DashMap<TypeId, Arc<RecordTypeInfo>>> =
    LazyLock::new(DashMap::new);

/// Returns the memoized [RecordTypeInfo] for `T`, building it on first
/// demand.
///
/// # Errors
/// `ErrorKind::Metadata` when two attributes of `T` map to the same column
/// name.
pub fn record_type_info<T: Record>() -> RowbindResult<Arc<RecordTypeInfo>> {
    let type_id = TypeId::of::<T>();
    if let Some(info) = RECORD_INFO_CACHE.get(&type_id) {
        return Ok(info.clone());
    }

    let built = Arc::new(build_record_type_info::<T>()?);
    // re-check under the shard lock so concurrent builders agree on one entry
    Ok(RECORD_INFO_CACHE.entry(type_id).or_insert(built).clone())
}

fn build_record_type_info<T: Record>() -> RowbindResult<RecordTypeInfo> {
    let descriptor = T::descriptor();
    let mut attributes = Vec::with_capacity(descriptor.attributes().len());
    let mut seen = HashSet::new();

    for attribute in descriptor.attributes() {
        let info = AttributeInfo::from_descriptor(attribute);
        if !seen.insert(info.matching_name().to_string()) {
            log::error!(
                "Attributes of {} map to the same column name '{}'",
                descriptor.type_name(),
                info.mapped_name()
            );
            return Err(RowbindError::new(
                &format!(
                    "Attributes of {} map to the same column name '{}'",
                    descriptor.type_name(),
                    info.mapped_name()
                ),
                ErrorKind::Metadata,
            ));
        }
        attributes.push(info);
    }

    let table_name = descriptor
        .table()
        .unwrap_or(descriptor.type_name())
        .to_string();

    Ok(RecordTypeInfo {
        type_id: TypeId::of::<T>(),
        type_name: descriptor.type_name().to_string(),
        table_name,
        attributes,
        dynamic: descriptor.is_dynamic(),
    })
}
