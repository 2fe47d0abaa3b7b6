// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Publishing settings to the host's property editor.
//!
//! The editor asks for one object at a time and receives the current values as
//! [`ObjectInstance`]s. Edits come back through the persisted property bag, so
//! anything enumerated here must round-trip through [`Settings::resolve`].
//!
//! [`Settings::resolve`]: crate::Settings::resolve

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use imagebar_dataview::{ObjectProperties, PropertyValue, SelectionKey};

use crate::model::Model;
use crate::selection::{MAX_OPACITY_PERCENT, MIN_OPACITY_PERCENT};
use crate::settings::{Settings, names};

/// An inclusive numeric range a property editor should enforce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberRange {
    /// Smallest valid value.
    pub min: f64,
    /// Largest valid value.
    pub max: f64,
}

/// The current values of one editable object (or one per-category instance of it).
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectInstance {
    /// Object name, as persisted.
    pub object_name: &'static str,
    /// Label shown by the editor, for per-category instances.
    pub display_name: Option<String>,
    /// Row the instance is scoped to, for per-category instances.
    pub selector: Option<SelectionKey>,
    /// Property values, in editor order.
    pub properties: Vec<(&'static str, PropertyValue)>,
    /// Valid ranges for numeric properties.
    pub valid_ranges: Vec<(&'static str, NumberRange)>,
}

impl ObjectInstance {
    fn new(object_name: &'static str) -> Self {
        Self {
            object_name,
            display_name: None,
            selector: None,
            properties: Vec::new(),
            valid_ranges: Vec::new(),
        }
    }

    fn with(mut self, property: &'static str, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((property, value.into()));
        self
    }

    fn with_range(mut self, property: &'static str, min: f64, max: f64) -> Self {
        self.valid_ranges.push((property, NumberRange { min, max }));
        self
    }

    /// Returns the current value of `property`.
    pub fn property(&self, property: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value)
    }

    /// Replaces the value of `property`, as an editor would.
    ///
    /// Unknown properties are ignored.
    pub fn set_property(&mut self, property: &str, value: impl Into<PropertyValue>) {
        if let Some((_, slot)) = self.properties.iter_mut().find(|(name, _)| *name == property) {
            *slot = value.into();
        }
    }

    /// The valid range of `property`, if it has one.
    pub fn valid_range(&self, property: &str) -> Option<NumberRange> {
        self.valid_ranges
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, range)| *range)
    }

    /// Writes every property into `bag`, clamping numbers into their valid ranges.
    pub fn persist_into(&self, bag: &mut ObjectProperties) {
        for (property, value) in &self.properties {
            let value = match (self.valid_range(property), value) {
                (Some(r), PropertyValue::Number(v)) => PropertyValue::Number(v.clamp(r.min, r.max)),
                _ => value.clone(),
            };
            match &self.selector {
                Some(selector) => bag.set_for(selector, self.object_name, property, value),
                None => bag.set(self.object_name, property, value),
            }
        }
    }
}

fn optional_number(value: Option<f64>) -> PropertyValue {
    value.map_or(PropertyValue::Null, PropertyValue::Number)
}

fn precision(value: usize) -> PropertyValue {
    PropertyValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Enumerates the instances of `object_name`.
///
/// `colorSelector` yields one instance per data point of `model`; unknown
/// object names yield nothing.
pub fn enumerate_objects(
    object_name: &str,
    settings: &Settings,
    model: Option<&Model>,
) -> Vec<ObjectInstance> {
    match object_name {
        names::CATEGORY_AXIS => {
            let axis = &settings.category_axis;
            alloc::vec![
                ObjectInstance::new(names::CATEGORY_AXIS)
                    .with(names::SHOW, axis.show)
                    .with(names::SHOW_AXIS_TITLE, axis.show_title)
                    .with(names::DISPLAY_UNITS, axis.display_units)
                    .with(names::PRECISION, precision(axis.precision))
                    .with(names::TITLE, axis.title.as_str())
                    .with(names::COLOR, PropertyValue::Fill(axis.color.clone()))
                    .with(names::FONT_SIZE, axis.font_size),
            ]
        }
        names::VALUE_AXIS => {
            let axis = &settings.value_axis;
            alloc::vec![
                ObjectInstance::new(names::VALUE_AXIS)
                    .with(names::SHOW, axis.show)
                    .with(names::SHOW_AXIS_TITLE, axis.show_title)
                    .with(names::MIN_VALUE, optional_number(axis.min_value))
                    .with(names::MAX_VALUE, optional_number(axis.max_value))
                    .with(names::DISPLAY_UNITS, axis.display_units)
                    .with(names::PRECISION, precision(axis.precision))
                    .with(names::TITLE, axis.title.as_str())
                    .with(names::COLOR, PropertyValue::Fill(axis.color.clone()))
                    .with(names::FONT_SIZE, axis.font_size),
            ]
        }
        names::ENABLE_IMAGES => alloc::vec![
            ObjectInstance::new(names::ENABLE_IMAGES).with(names::SHOW, settings.enable_images.show),
        ],
        names::GENERAL_VIEW => alloc::vec![
            ObjectInstance::new(names::GENERAL_VIEW)
                .with(names::OPACITY, settings.general_view.opacity)
                .with_range(names::OPACITY, MIN_OPACITY_PERCENT, MAX_OPACITY_PERCENT),
        ],
        names::COLOR_SELECTOR => model
            .map(|m| {
                m.data_points
                    .iter()
                    .map(|p| {
                        let mut instance = ObjectInstance::new(names::COLOR_SELECTOR)
                            .with(names::FILL, PropertyValue::Fill(p.color.clone()));
                        instance.display_name = Some(p.category.clone());
                        instance.selector = Some(p.key.clone());
                        instance
                    })
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use imagebar_dataview::{CategoricalResult, RoleMap};

    use super::*;
    use crate::color::CachingPalette;
    use crate::format::DefaultFormatterFactory;
    use crate::model::{DataBinder, test_category};

    fn bind(objects: &ObjectProperties) -> Model {
        let result = CategoricalResult::new(vec![test_category("Region", &["A", "B"])], vec![])
            .expect("valid");
        let settings = Settings::resolve(objects);
        let palette = CachingPalette::default();
        DataBinder::new(&settings, objects, &palette, &DefaultFormatterFactory)
            .bind(&result, &RoleMap::new(&result))
    }

    #[test]
    fn general_view_advertises_opacity_range() {
        let instances = enumerate_objects(names::GENERAL_VIEW, &Settings::default(), None);
        assert_eq!(instances.len(), 1);
        assert_eq!(
            instances[0].valid_range(names::OPACITY),
            Some(NumberRange {
                min: 10.0,
                max: 100.0
            })
        );
        assert_eq!(
            instances[0].property(names::OPACITY),
            Some(&PropertyValue::Number(100.0))
        );
    }

    #[test]
    fn persisted_opacity_is_clamped() {
        let mut instance = enumerate_objects(names::GENERAL_VIEW, &Settings::default(), None)
            .pop()
            .expect("one instance");
        instance.set_property(names::OPACITY, 3.0);
        let mut bag = ObjectProperties::new();
        instance.persist_into(&mut bag);
        assert_eq!(Settings::resolve(&bag).general_view.opacity, 10.0);
    }

    #[test]
    fn color_selector_round_trips_through_binding() {
        let model = bind(&ObjectProperties::new());
        let mut instances = enumerate_objects(names::COLOR_SELECTOR, &model.settings, Some(&model));
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[1].display_name.as_deref(), Some("B"));
        assert_eq!(instances[1].selector.as_ref(), Some(&model.data_points[1].key));

        instances[1].set_property(names::FILL, PropertyValue::Fill("#102030".into()));
        let mut bag = ObjectProperties::new();
        instances[1].persist_into(&mut bag);
        let rebound = bind(&bag);
        assert_eq!(rebound.data_points[1].color, "#102030");
        assert_eq!(rebound.data_points[0].color, model.data_points[0].color);
    }

    #[test]
    fn axis_settings_round_trip() {
        let mut settings = Settings::default();
        settings.value_axis.min_value = Some(-5.0);
        settings.value_axis.title = "Revenue".into();
        settings.category_axis.precision = 0;
        let mut bag = ObjectProperties::new();
        for name in [names::CATEGORY_AXIS, names::VALUE_AXIS, names::ENABLE_IMAGES] {
            for instance in enumerate_objects(name, &settings, None) {
                instance.persist_into(&mut bag);
            }
        }
        assert_eq!(Settings::resolve(&bag), settings);
    }

    #[test]
    fn unknown_objects_yield_nothing() {
        assert!(enumerate_objects("legend", &Settings::default(), None).is_empty());
        assert!(enumerate_objects(names::COLOR_SELECTOR, &Settings::default(), None).is_empty());
    }
}
