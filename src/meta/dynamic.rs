use indexmap::IndexMap;

use crate::common::Value;
use crate::errors::RowbindResult;
use crate::meta::{Record, RecordDescriptor};

/// A record whose attributes are only known at call time.
///
/// # Purpose
/// The dynamic counterpart of a statically-typed [Record]: an ordered map
/// of attribute name to [Value]. Accessor plans built for dynamic records
/// resolve attributes by name when invoked instead of binding them at
/// compile time.
///
/// # Characteristics
/// - **Ordered**: iteration follows insertion order
/// - **Schemaless**: any attribute name can be written; absent reads
///   yield `None`
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DynamicRecord {
    values: IndexMap<String, Value>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        DynamicRecord {
            values: IndexMap::new(),
        }
    }

    /// Sets an attribute, replacing any existing value under the name.
    pub fn put<V: Into<Value>>(&mut self, name: &str, value: V) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<IndexMap<String, Value>> for DynamicRecord {
    fn from(values: IndexMap<String, Value>) -> Self {
        DynamicRecord { values }
    }
}

impl Record for DynamicRecord {
    fn descriptor() -> RecordDescriptor {
        RecordDescriptor::dynamic("DynamicRecord")
    }

    fn read_attribute(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn write_attribute(&mut self, name: &str, value: Value) -> RowbindResult<()> {
        self.values.insert(name.to_string(), value);
        Ok(())
    }
}
