use crate::common::Value;
use crate::db::DbTypeCode;

/// Direction of a command parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum ParameterDirection {
    #[default]
    Input,
    Output,
}

/// A single command parameter as consumed by the driver.
///
/// All properties are writable; compiled parameter setters populate them
/// and drivers read them back. [Value::Null] is the database null
/// sentinel.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Parameter {
    name: String,
    value: Value,
    db_type: Option<DbTypeCode>,
    direction: ParameterDirection,
    size: Option<i32>,
    precision: Option<u8>,
    scale: Option<u8>,
}

impl Parameter {
    pub fn new() -> Self {
        Parameter::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn db_type(&self) -> Option<DbTypeCode> {
        self.db_type
    }

    pub fn set_db_type(&mut self, db_type: DbTypeCode) {
        self.db_type = Some(db_type);
    }

    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: ParameterDirection) {
        self.direction = direction;
    }

    pub fn size(&self) -> Option<i32> {
        self.size
    }

    pub fn set_size(&mut self, size: i32) {
        self.size = Some(size);
    }

    pub fn precision(&self) -> Option<u8> {
        self.precision
    }

    pub fn set_precision(&mut self, precision: u8) {
        self.precision = Some(precision);
    }

    pub fn scale(&self) -> Option<u8> {
        self.scale
    }

    pub fn set_scale(&mut self, scale: u8) {
        self.scale = Some(scale);
    }
}

/// Ordered collection of command parameters with name lookup.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ParameterCollection {
    parameters: Vec<Parameter>,
}

impl ParameterCollection {
    pub fn new() -> Self {
        ParameterCollection::default()
    }

    /// Appends a parameter, preserving insertion order.
    pub fn add(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn clear(&mut self) {
        self.parameters.clear();
    }

    /// Finds a parameter by exact name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.iter_mut().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// The command interface consumed by compiled parameter setters.
pub trait DbCommand {
    /// Creates a fresh, unattached parameter object.
    fn create_parameter(&self) -> Parameter {
        Parameter::new()
    }

    fn parameters(&self) -> &ParameterCollection;

    fn parameters_mut(&mut self) -> &mut ParameterCollection;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_defaults() {
        let parameter = Parameter::new();
        assert_eq!(parameter.name(), "");
        assert_eq!(parameter.value(), &Value::Null);
        assert_eq!(parameter.direction(), ParameterDirection::Input);
        assert!(parameter.db_type().is_none());
        assert!(parameter.size().is_none());
    }

    #[test]
    fn test_parameter_setters() {
        let mut parameter = Parameter::new();
        parameter.set_name("Id");
        parameter.set_value(Value::I32(7));
        parameter.set_db_type(DbTypeCode::Int32);
        parameter.set_direction(ParameterDirection::Output);
        parameter.set_size(4);
        parameter.set_precision(10);
        parameter.set_scale(2);
        assert_eq!(parameter.name(), "Id");
        assert_eq!(parameter.value(), &Value::I32(7));
        assert_eq!(parameter.db_type(), Some(DbTypeCode::Int32));
        assert_eq!(parameter.direction(), ParameterDirection::Output);
        assert_eq!(parameter.size(), Some(4));
        assert_eq!(parameter.precision(), Some(10));
        assert_eq!(parameter.scale(), Some(2));
    }

    #[test]
    fn test_collection_order_and_lookup() {
        let mut collection = ParameterCollection::new();
        let mut a = Parameter::new();
        a.set_name("A");
        let mut b = Parameter::new();
        b.set_name("B");
        collection.add(a);
        collection.add(b);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.as_slice()[0].name(), "A");
        assert_eq!(collection.as_slice()[1].name(), "B");
        assert!(collection.get("B").is_some());
        assert!(collection.get("b").is_none());
    }

    #[test]
    fn test_collection_clear() {
        let mut collection = ParameterCollection::new();
        collection.add(Parameter::new());
        collection.clear();
        assert!(collection.is_empty());
    }
}
