// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted object properties.
//!
//! The host persists format-pane edits as an opaque bag keyed by
//! `(object name, property name)`. Per-category edits (bar colors) are stored
//! in a second bag per [`SelectionKey`]. Typed interpretation of the values
//! happens downstream; this type only stores and returns them.

extern crate alloc;

use alloc::string::String;

use hashbrown::HashMap;

use crate::selection::SelectionKey;

/// A persisted primitive property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// An explicit null (e.g. a cleared axis bound).
    Null,
    /// A boolean.
    Bool(bool),
    /// A floating point number.
    Number(f64),
    /// An integer.
    Integer(i64),
    /// Free text.
    Text(String),
    /// A solid fill color, as the host formats it (e.g. `"#01B8AA"`).
    Fill(String),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

/// Properties of one object, keyed by property name.
pub type PropertyMap = HashMap<String, PropertyValue>;

/// The persisted property bag of one visual instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectProperties {
    objects: HashMap<String, PropertyMap>,
    selectors: HashMap<SelectionKey, HashMap<String, PropertyMap>>,
}

impl ObjectProperties {
    /// An empty bag: every property resolves to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value for `(object, property)`.
    pub fn set(&mut self, object: &str, property: &str, value: impl Into<PropertyValue>) {
        self.objects
            .entry(String::from(object))
            .or_default()
            .insert(String::from(property), value.into());
    }

    /// Builder form of [`ObjectProperties::set`].
    #[must_use]
    pub fn with(mut self, object: &str, property: &str, value: impl Into<PropertyValue>) -> Self {
        self.set(object, property, value);
        self
    }

    /// Stores a value for `(object, property)` scoped to one row.
    pub fn set_for(
        &mut self,
        selector: &SelectionKey,
        object: &str,
        property: &str,
        value: impl Into<PropertyValue>,
    ) {
        self.selectors
            .entry(selector.clone())
            .or_default()
            .entry(String::from(object))
            .or_default()
            .insert(String::from(property), value.into());
    }

    /// Returns the value stored for `(object, property)`.
    pub fn get(&self, object: &str, property: &str) -> Option<&PropertyValue> {
        self.objects.get(object)?.get(property)
    }

    /// Returns the value stored for `(object, property)` scoped to `selector`.
    pub fn get_for(
        &self,
        selector: &SelectionKey,
        object: &str,
        property: &str,
    ) -> Option<&PropertyValue> {
        self.selectors.get(selector)?.get(object)?.get(property)
    }

    /// Removes a stored value, returning it.
    pub fn remove(&mut self, object: &str, property: &str) -> Option<PropertyValue> {
        self.objects.get_mut(object)?.remove(property)
    }

    /// Returns `true` if nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.objects.values().all(|m| m.is_empty())
            && self
                .selectors
                .values()
                .all(|objects| objects.values().all(|m| m.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PrimitiveValue;

    #[test]
    fn global_and_scoped_values_are_independent() {
        let key = SelectionKey::new("Region", &PrimitiveValue::from("A"));
        let mut bag = ObjectProperties::new().with("generalView", "opacity", 50.0);
        bag.set_for(&key, "colorSelector", "fill", PropertyValue::Fill("#ff0000".into()));

        assert_eq!(
            bag.get("generalView", "opacity"),
            Some(&PropertyValue::Number(50.0))
        );
        assert_eq!(bag.get("colorSelector", "fill"), None);
        assert_eq!(
            bag.get_for(&key, "colorSelector", "fill"),
            Some(&PropertyValue::Fill("#ff0000".into()))
        );
        let other = SelectionKey::new("Region", &PrimitiveValue::from("B"));
        assert_eq!(bag.get_for(&other, "colorSelector", "fill"), None);
    }

    #[test]
    fn later_writes_replace_earlier_ones() {
        let mut bag = ObjectProperties::new();
        assert!(bag.is_empty());
        bag.set("valueAxis", "show", false);
        bag.set("valueAxis", "show", true);
        assert_eq!(bag.get("valueAxis", "show"), Some(&PropertyValue::Bool(true)));
        assert_eq!(bag.remove("valueAxis", "show"), Some(PropertyValue::Bool(true)));
        assert!(bag.is_empty());
    }
}
