use crate::common::{matching_name, unquote_name, Value, ValueType};
use crate::errors::RowbindResult;

/// Declares one attribute of a record type.
///
/// # Purpose
/// Supplies the static metadata the mapping core needs about a single
/// record attribute: its canonical name, an optional mapped column name
/// override, its declared value type, and its nullability and access
/// flags.
///
/// # Usage
/// ```ignore
/// AttributeDescriptor::new("id", ValueType::I32)
/// AttributeDescriptor::new("middle_name", ValueType::String).nullable()
/// AttributeDescriptor::new("name", ValueType::String).with_column("[FullName]")
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDescriptor {
    name: String,
    column: Option<String>,
    value_type: ValueType,
    nullable: bool,
    readable: bool,
    writable: bool,
}

impl AttributeDescriptor {
    /// Creates a readable, writable, non-nullable attribute declaration.
    pub fn new(name: &str, value_type: ValueType) -> Self {
        AttributeDescriptor {
            name: name.to_string(),
            column: None,
            value_type,
            nullable: false,
            readable: true,
            writable: true,
        }
    }

    /// Overrides the mapped column name; quoting is accepted and stripped
    /// during metadata extraction.
    pub fn with_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    /// Marks the attribute as nullable (the nullable-of-value-type or
    /// optional-reference form).
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the attribute read-only; it is skipped during row binding.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Marks the attribute write-only; it cannot source parameter values.
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}

/// Declares a record type: its name, mapped table and ordered attributes.
///
/// Returned by [Record::descriptor]; extraction into cached
/// [crate::meta::RecordTypeInfo] happens once per type.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordDescriptor {
    type_name: String,
    table: Option<String>,
    attributes: Vec<AttributeDescriptor>,
    dynamic: bool,
}

impl RecordDescriptor {
    /// Creates a descriptor for a statically-typed record.
    pub fn new(type_name: &str) -> Self {
        RecordDescriptor {
            type_name: type_name.to_string(),
            table: None,
            attributes: Vec::new(),
            dynamic: false,
        }
    }

    /// Creates a descriptor for a dynamic record whose attributes are only
    /// known at call time.
    pub fn dynamic(type_name: &str) -> Self {
        RecordDescriptor {
            type_name: type_name.to_string(),
            table: None,
            attributes: Vec::new(),
            dynamic: true,
        }
    }

    /// Overrides the mapped table name (defaults to the type name).
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Appends an attribute declaration.
    pub fn with_attribute(mut self, attribute: AttributeDescriptor) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }
}

/// Trait implemented by user record types that map to table rows.
///
/// # Purpose
/// The mapping core has no runtime reflection; this trait is the seam
/// through which it learns a type's attribute metadata and moves values in
/// and out of attribute storage. Compiled accessor plans resolve all
/// metadata once at build time and then call only `read_attribute` /
/// `write_attribute` per row.
///
/// # Usage
/// ```ignore
/// #[derive(Default)]
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// impl Record for User {
///     fn descriptor() -> RecordDescriptor {
///         RecordDescriptor::new("User")
///             .with_attribute(AttributeDescriptor::new("id", ValueType::I32))
///             .with_attribute(AttributeDescriptor::new("name", ValueType::String))
///     }
///
///     fn read_attribute(&self, name: &str) -> Option<Value> {
///         match name {
///             "id" => Some(self.id.into()),
///             "name" => Some(self.name.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn write_attribute(&mut self, name: &str, value: Value) -> RowbindResult<()> {
///         match name {
///             "id" => self.id = value.as_i32().unwrap_or_default(),
///             "name" => self.name = value.as_string().unwrap_or_default().to_string(),
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Record: Default + 'static {
    /// Returns the static metadata for this record type.
    fn descriptor() -> RecordDescriptor
    where
        Self: Sized;

    /// Reads an attribute by its canonical name.
    ///
    /// Returns `None` when the attribute does not exist (for dynamic
    /// records, when no entry with that name is present).
    fn read_attribute(&self, name: &str) -> Option<Value>;

    /// Writes an attribute by its canonical name.
    fn write_attribute(&mut self, name: &str, value: Value) -> RowbindResult<()>;
}

/// Canonical, extracted metadata for one record attribute.
///
/// Built with the owning [crate::meta::RecordTypeInfo] and immutable
/// afterwards. The mapped column name is stored unquoted; the matching
/// name additionally lowercased for case-insensitive column matching.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeInfo {
    name: String,
    mapped_name: String,
    matching_name: String,
    value_type: ValueType,
    nullable: bool,
    readable: bool,
    writable: bool,
}

impl AttributeInfo {
    pub(crate) fn from_descriptor(descriptor: &AttributeDescriptor) -> Self {
        let mapped = descriptor.column().unwrap_or(descriptor.name());
        AttributeInfo {
            name: descriptor.name().to_string(),
            mapped_name: unquote_name(mapped),
            matching_name: matching_name(mapped),
            value_type: descriptor.value_type(),
            nullable: descriptor.is_nullable(),
            readable: descriptor.is_readable(),
            writable: descriptor.is_writable(),
        }
    }

    /// The canonical attribute name, as declared on the record type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mapped column name with any identifier quoting stripped.
    pub fn mapped_name(&self) -> &str {
        &self.mapped_name
    }

    /// The lowercased mapped name used for case-insensitive matching.
    pub fn matching_name(&self) -> &str {
        &self.matching_name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }
}
