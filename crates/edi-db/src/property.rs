//! Per-scope sparse properties.
//!
//! Most records carry no user properties, so they are kept outside the
//! records in a map keyed by `(object id, property name)`.

use std::collections::HashMap;
use std::fmt;

use edi_core::ObjectId;
use indexmap::IndexMap;

/// A property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Signed integer.
    Int(i64),
    /// Floating point.
    Real(f64),
    /// Boolean.
    Bool(bool),
    /// Free text.
    String(String),
    /// Reference to another record.
    Object(ObjectId),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{v}\""),
            Self::Object(id) => write!(f, "#{id}"),
        }
    }
}

/// Properties of every object in one scope.
#[derive(Clone, Debug, Default)]
pub struct PropertyManager {
    by_object: HashMap<ObjectId, IndexMap<String, PropertyValue>>,
}

impl PropertyManager {
    /// An empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` on `id`, returning the previous value.
    pub fn set(
        &mut self,
        id: ObjectId,
        name: &str,
        value: PropertyValue,
    ) -> Option<PropertyValue> {
        self.by_object
            .entry(id)
            .or_default()
            .insert(name.to_string(), value)
    }

    /// Value of `name` on `id`.
    pub fn get(&self, id: ObjectId, name: &str) -> Option<&PropertyValue> {
        self.by_object.get(&id)?.get(name)
    }

    /// All properties of `id` in insertion order.
    pub fn properties(&self, id: ObjectId) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.by_object
            .get(&id)
            .into_iter()
            .flat_map(|props| props.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Remove one property.
    pub fn remove(&mut self, id: ObjectId, name: &str) -> Option<PropertyValue> {
        let props = self.by_object.get_mut(&id)?;
        let value = props.shift_remove(name);
        if props.is_empty() {
            self.by_object.remove(&id);
        }
        value
    }

    /// Remove every property of `id`. Returns how many were removed.
    pub fn remove_all(&mut self, id: ObjectId) -> usize {
        self.by_object.remove(&id).map_or(0, |p| p.len())
    }

    /// Whether `id` has any property.
    pub fn has_properties(&self, id: ObjectId) -> bool {
        self.by_object.contains_key(&id)
    }

    /// Number of objects with at least one property.
    pub fn object_count(&self) -> usize {
        self.by_object.len()
    }

    /// Approximate heap bytes held.
    pub fn memory(&self) -> usize {
        self.by_object
            .values()
            .flat_map(|props| props.keys())
            .map(|k| k.capacity() + std::mem::size_of::<PropertyValue>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> ObjectId {
        ObjectId::from_raw(raw)
    }

    #[test]
    fn set_get_and_overwrite() {
        let mut m = PropertyManager::new();
        assert_eq!(m.set(id(1), "width", PropertyValue::Int(4)), None);
        assert_eq!(
            m.set(id(1), "width", PropertyValue::Int(8)),
            Some(PropertyValue::Int(4))
        );
        assert_eq!(m.get(id(1), "width"), Some(&PropertyValue::Int(8)));
        assert_eq!(m.get(id(2), "width"), None);
    }

    #[test]
    fn properties_keep_insertion_order() {
        let mut m = PropertyManager::new();
        m.set(id(1), "b", PropertyValue::Bool(true));
        m.set(id(1), "a", PropertyValue::Real(0.5));
        let names: Vec<_> = m.properties(id(1)).map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(m.properties(id(9)).count(), 0);
    }

    #[test]
    fn removal() {
        let mut m = PropertyManager::new();
        m.set(id(1), "x", PropertyValue::String("top".into()));
        m.set(id(1), "y", PropertyValue::Object(id(2)));
        assert_eq!(
            m.remove(id(1), "x"),
            Some(PropertyValue::String("top".into()))
        );
        assert!(m.has_properties(id(1)));
        assert_eq!(m.remove(id(1), "y"), Some(PropertyValue::Object(id(2))));
        assert!(!m.has_properties(id(1)));

        m.set(id(3), "a", PropertyValue::Int(1));
        m.set(id(3), "b", PropertyValue::Int(2));
        assert_eq!(m.remove_all(id(3)), 2);
        assert_eq!(m.remove_all(id(3)), 0);
        assert_eq!(m.object_count(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(PropertyValue::String("a".into()).to_string(), "\"a\"");
        assert_eq!(PropertyValue::Object(id(5)).to_string(), "#5");
    }
}
