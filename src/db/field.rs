use crate::common::{matching_name, unquote_name, ValueType};

/// Abstract description of a database column.
///
/// # Purpose
/// The caller-supplied input shape of parameter emission and the
/// nullability source of row binding. The name is stored unquoted; any
/// identifier quoting is stripped on construction.
///
/// # Characteristics
/// - **Plain value object**: treated as immutable input once built
/// - **Optional sizing**: size, precision and scale are carried only when
///   the caller knows them
/// - **Vendor typed**: an optional vendor type string rides along for
///   driver-specific behavior (e.g. the `image` size quirk)
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct DbField {
    name: String,
    field_type: ValueType,
    nullable: bool,
    size: Option<i32>,
    precision: Option<u8>,
    scale: Option<u8>,
    provider_type: Option<String>,
}

impl DbField {
    /// Creates a field descriptor; `name` may carry identifier quoting,
    /// which is stripped.
    pub fn new(name: &str, field_type: ValueType, nullable: bool) -> Self {
        DbField {
            name: unquote_name(name),
            field_type,
            nullable,
            size: None,
            precision: None,
            scale: None,
            provider_type: None,
        }
    }

    pub fn with_size(mut self, size: i32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_provider_type(mut self, provider_type: &str) -> Self {
        self.provider_type = Some(provider_type.to_string());
        self
    }

    /// The unquoted column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lowercased name used for case-insensitive matching.
    pub fn matching_name(&self) -> String {
        matching_name(&self.name)
    }

    pub fn field_type(&self) -> ValueType {
        self.field_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn size(&self) -> Option<i32> {
        self.size
    }

    pub fn precision(&self) -> Option<u8> {
        self.precision
    }

    pub fn scale(&self) -> Option<u8> {
        self.scale
    }

    pub fn provider_type(&self) -> Option<&str> {
        self.provider_type.as_deref()
    }

    /// Case-insensitive vendor type comparison.
    pub fn has_provider_type(&self, name: &str) -> bool {
        self.provider_type
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(name))
    }
}
