// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed settings resolved from the persisted property bag.
//!
//! Every property has a documented default. A persisted value is used only when
//! it has the expected type; anything else falls back to the default and is
//! logged at debug level. Resolution never fails.

extern crate alloc;

use alloc::string::String;

use imagebar_dataview::{ObjectProperties, PropertyValue};

/// Object and property names as the host persists them.
pub mod names {
    /// Category (horizontal) axis object.
    pub const CATEGORY_AXIS: &str = "categoryAxis";
    /// Value (vertical) axis object.
    pub const VALUE_AXIS: &str = "valueAxis";
    /// Image texture toggle object.
    pub const ENABLE_IMAGES: &str = "enableImages";
    /// General appearance object.
    pub const GENERAL_VIEW: &str = "generalView";
    /// Per-category color object.
    pub const COLOR_SELECTOR: &str = "colorSelector";

    /// Visibility toggle.
    pub const SHOW: &str = "show";
    /// Axis title visibility toggle.
    pub const SHOW_AXIS_TITLE: &str = "showAxisTitle";
    /// Display units divisor (`0` = auto).
    pub const DISPLAY_UNITS: &str = "displayUnits";
    /// Decimal places.
    pub const PRECISION: &str = "precision";
    /// Axis title text.
    pub const TITLE: &str = "title";
    /// Axis label color.
    pub const COLOR: &str = "color";
    /// Axis label font size.
    pub const FONT_SIZE: &str = "fontSize";
    /// Explicit value-axis minimum.
    pub const MIN_VALUE: &str = "minValue";
    /// Explicit value-axis maximum.
    pub const MAX_VALUE: &str = "maxValue";
    /// Overall bar opacity in percent.
    pub const OPACITY: &str = "opacity";
    /// Bar fill color.
    pub const FILL: &str = "fill";
}

/// Decimal places used when nothing valid is persisted.
pub const DEFAULT_PRECISION: usize = 2;
/// Axis font size used when nothing valid is persisted.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
/// Bar opacity (percent) used when nothing valid is persisted.
pub const DEFAULT_OPACITY: f64 = 100.0;

/// Largest `precision` accepted from the property bag.
pub const MAX_PRECISION: usize = 20;

/// Category axis settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryAxisSettings {
    /// Whether the axis (and its margin) is shown.
    pub show: bool,
    /// Whether the axis title is shown.
    pub show_title: bool,
    /// Display units divisor; `0` picks a unit automatically.
    pub display_units: f64,
    /// Decimal places for numeric labels.
    pub precision: usize,
    /// Axis title. Empty means "use the column display name".
    pub title: String,
    /// Label color as the host formats it. Empty means "renderer default".
    pub color: String,
    /// Label font size.
    pub font_size: f64,
}

impl Default for CategoryAxisSettings {
    fn default() -> Self {
        Self {
            show: true,
            show_title: false,
            display_units: 0.0,
            precision: DEFAULT_PRECISION,
            title: String::new(),
            color: String::new(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Value axis settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueAxisSettings {
    /// Whether the axis (and its margin) is shown.
    pub show: bool,
    /// Whether the axis title is shown.
    pub show_title: bool,
    /// Explicit lower bound, honored only when it stays below the observed maximum.
    pub min_value: Option<f64>,
    /// Explicit upper bound, honored only when it stays above the observed minimum.
    pub max_value: Option<f64>,
    /// Display units divisor; `0` picks a unit automatically.
    pub display_units: f64,
    /// Decimal places for tick labels.
    pub precision: usize,
    /// Axis title. Empty means "use the column display name".
    pub title: String,
    /// Label color as the host formats it. Empty means "renderer default".
    pub color: String,
    /// Label font size.
    pub font_size: f64,
}

impl Default for ValueAxisSettings {
    fn default() -> Self {
        Self {
            show: true,
            show_title: false,
            min_value: None,
            max_value: None,
            display_units: 0.0,
            precision: DEFAULT_PRECISION,
            title: String::new(),
            color: String::new(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Image texture settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSettings {
    /// Whether bars are filled with their category image when one is available.
    pub show: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self { show: true }
    }
}

/// General appearance settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneralViewSettings {
    /// Bar opacity in percent, as persisted (consumers clamp it).
    pub opacity: f64,
}

impl Default for GeneralViewSettings {
    fn default() -> Self {
        Self {
            opacity: DEFAULT_OPACITY,
        }
    }
}

/// An immutable settings snapshot for one update cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    /// Category axis group.
    pub category_axis: CategoryAxisSettings,
    /// Value axis group.
    pub value_axis: ValueAxisSettings,
    /// Image texture group.
    pub enable_images: ImageSettings,
    /// General appearance group.
    pub general_view: GeneralViewSettings,
}

impl Settings {
    /// Resolves a snapshot from the persisted property bag.
    pub fn resolve(objects: &ObjectProperties) -> Self {
        let defaults = Self::default();

        let cat = PropertyReader::new(objects, names::CATEGORY_AXIS);
        let d = &defaults.category_axis;
        let category_axis = CategoryAxisSettings {
            show: cat.bool(names::SHOW, d.show),
            show_title: cat.bool(names::SHOW_AXIS_TITLE, d.show_title),
            display_units: cat.number(names::DISPLAY_UNITS, d.display_units),
            precision: cat.precision(names::PRECISION, d.precision),
            title: cat.text(names::TITLE, &d.title),
            color: cat.text(names::COLOR, &d.color),
            font_size: cat.font_size(names::FONT_SIZE, d.font_size),
        };

        let val = PropertyReader::new(objects, names::VALUE_AXIS);
        let d = &defaults.value_axis;
        let value_axis = ValueAxisSettings {
            show: val.bool(names::SHOW, d.show),
            show_title: val.bool(names::SHOW_AXIS_TITLE, d.show_title),
            min_value: val.optional_number(names::MIN_VALUE, d.min_value),
            max_value: val.optional_number(names::MAX_VALUE, d.max_value),
            display_units: val.number(names::DISPLAY_UNITS, d.display_units),
            precision: val.precision(names::PRECISION, d.precision),
            title: val.text(names::TITLE, &d.title),
            color: val.text(names::COLOR, &d.color),
            font_size: val.font_size(names::FONT_SIZE, d.font_size),
        };

        let images = PropertyReader::new(objects, names::ENABLE_IMAGES);
        let enable_images = ImageSettings {
            show: images.bool(names::SHOW, defaults.enable_images.show),
        };

        let general = PropertyReader::new(objects, names::GENERAL_VIEW);
        let general_view = GeneralViewSettings {
            opacity: general.number(names::OPACITY, defaults.general_view.opacity),
        };

        Self {
            category_axis,
            value_axis,
            enable_images,
            general_view,
        }
    }
}

/// Typed reads from one object of the property bag.
struct PropertyReader<'a> {
    objects: &'a ObjectProperties,
    object: &'static str,
}

impl<'a> PropertyReader<'a> {
    fn new(objects: &'a ObjectProperties, object: &'static str) -> Self {
        Self { objects, object }
    }

    fn get(&self, property: &str) -> Option<&'a PropertyValue> {
        self.objects.get(self.object, property)
    }

    fn malformed(&self, property: &str, value: &PropertyValue) {
        tracing::debug!(
            object = self.object,
            property,
            ?value,
            "malformed persisted property, using default"
        );
    }

    fn bool(&self, property: &str, default: bool) -> bool {
        match self.get(property) {
            None => default,
            Some(PropertyValue::Bool(b)) => *b,
            Some(other) => {
                self.malformed(property, other);
                default
            }
        }
    }

    fn number(&self, property: &str, default: f64) -> f64 {
        match self.get(property) {
            None => default,
            Some(value) => as_number(value).unwrap_or_else(|| {
                self.malformed(property, value);
                default
            }),
        }
    }

    fn font_size(&self, property: &str, default: f64) -> f64 {
        match self.get(property) {
            None => default,
            Some(value) => match as_number(value) {
                Some(v) if v > 0.0 => v,
                _ => {
                    self.malformed(property, value);
                    default
                }
            },
        }
    }

    fn precision(&self, property: &str, default: usize) -> usize {
        match self.get(property) {
            None => default,
            Some(value) => as_precision(value).unwrap_or_else(|| {
                self.malformed(property, value);
                default
            }),
        }
    }

    fn optional_number(&self, property: &str, default: Option<f64>) -> Option<f64> {
        match self.get(property) {
            None => default,
            Some(PropertyValue::Null) => None,
            Some(value) => match as_number(value) {
                Some(v) => Some(v),
                None => {
                    self.malformed(property, value);
                    default
                }
            },
        }
    }

    fn text(&self, property: &str, default: &str) -> String {
        match self.get(property) {
            None => String::from(default),
            Some(PropertyValue::Text(s) | PropertyValue::Fill(s)) => s.clone(),
            Some(other) => {
                self.malformed(property, other);
                String::from(default)
            }
        }
    }
}

fn as_number(value: &PropertyValue) -> Option<f64> {
    match value {
        PropertyValue::Number(v) if v.is_finite() => Some(*v),
        PropertyValue::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn as_precision(value: &PropertyValue) -> Option<usize> {
    let precision = match value {
        PropertyValue::Integer(i) => usize::try_from(*i).ok()?,
        PropertyValue::Number(v) if v.is_finite() && *v >= 0.0 && *v % 1.0 == 0.0 => {
            if *v > MAX_PRECISION as f64 {
                return None;
            }
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "checked integral and within 0..=MAX_PRECISION"
            )]
            {
                *v as usize
            }
        }
        _ => return None,
    };
    (precision <= MAX_PRECISION).then_some(precision)
}
