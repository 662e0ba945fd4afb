//! Named parameters
//!
//! Parameters are stored in creation order; lookups are linear, which is
//! fine for the handful of parameters a scene object carries.

use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::Vec3;

/// Typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Scalar float
    Float(f32),
    /// Scalar integer
    Int(i32),
    /// 3-component float vector
    Vec3(Vec3),
    /// String
    String(String),
    /// Reference to another managed object (non-owning)
    Object(ObjectHandle),
    /// Reference to a data buffer (non-owning)
    Data(ObjectHandle),
}

impl ParamValue {
    /// Short name of the value type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Vec3(_) => "vec3f",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Data(_) => "data",
        }
    }
}

/// A named parameter slot
///
/// A freshly created slot is empty until the first [`set`](Self::set).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    value: Option<ParamValue>,
}

impl Param {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, `None` for an empty slot
    pub fn value(&self) -> Option<&ParamValue> {
        self.value.as_ref()
    }

    /// Whether the slot holds a value
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Overwrite the value
    pub fn set(&mut self, value: ParamValue) {
        self.value = Some(value);
    }

    /// Empty the slot
    pub fn clear(&mut self) {
        self.value = None;
    }
}

/// Ordered collection of parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    params: Vec<Param>,
}

impl ParamSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a slot by name
    pub fn find(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|param| param.name == name)
    }

    /// Find a slot by name for writing
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.iter_mut().find(|param| param.name == name)
    }

    /// Return the named slot, creating an empty one if needed
    pub fn create_if_absent(&mut self, name: &str) -> &mut Param {
        let index = match self.params.iter().position(|param| param.name == name) {
            Some(index) => index,
            None => {
                self.params.push(Param::new(name));
                self.params.len() - 1
            }
        };
        &mut self.params[index]
    }

    /// Number of slots, empty ones included
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no slots
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate slots in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_if_absent_is_idempotent() {
        let mut params = ParamSet::new();
        params.create_if_absent("radius").set(ParamValue::Float(1.0));
        let again = params.create_if_absent("radius");
        assert_eq!(again.value(), Some(&ParamValue::Float(1.0)));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_set_overwrites_and_keeps_order() {
        let mut params = ParamSet::new();
        params.create_if_absent("a").set(ParamValue::Int(1));
        params.create_if_absent("b").set(ParamValue::Int(2));
        params.create_if_absent("a").set(ParamValue::Float(3.0));

        let names: Vec<_> = params.iter().map(Param::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(params.find("a").and_then(Param::value), Some(&ParamValue::Float(3.0)));
    }

    #[test]
    fn test_clear_empties_slot() {
        let mut params = ParamSet::new();
        params.create_if_absent("a").set(ParamValue::Int(1));
        params.find_mut("a").unwrap().clear();
        assert!(!params.find("a").unwrap().is_set());
    }
}
