// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-category colors.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Debug;

use hashbrown::HashMap;
use imagebar_dataview::{ObjectProperties, PropertyValue, SelectionKey};

use crate::settings::names;

/// A palette service handing out default colors by key.
///
/// Implementations must return the same color for the same key within a session.
pub trait ColorPalette: Debug {
    /// Returns the color for `key`.
    fn color(&self, key: &str) -> String;
}

impl<T: ColorPalette + ?Sized> ColorPalette for &T {
    fn color(&self, key: &str) -> String {
        (**self).color(key)
    }
}

/// Colors of the host's default theme, in assignment order.
pub const DEFAULT_COLORS: [&str; 10] = [
    "#01B8AA", "#374649", "#FD625E", "#F2C80F", "#5F6B6D", "#8AD4EB", "#FE9666", "#A66999",
    "#3599B8", "#DFBFBF",
];

/// A palette that assigns colors in first-seen order and caches them per key.
///
/// Keys beyond the palette length wrap around.
#[derive(Debug)]
pub struct CachingPalette {
    colors: Vec<String>,
    assigned: RefCell<HashMap<String, String>>,
}

impl CachingPalette {
    /// Creates a palette cycling through `colors`.
    ///
    /// An empty list hands out black.
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            colors: colors.into_iter().map(Into::into).collect(),
            assigned: RefCell::new(HashMap::new()),
        }
    }

    /// Number of keys assigned so far.
    pub fn assigned_len(&self) -> usize {
        self.assigned.borrow().len()
    }
}

impl Default for CachingPalette {
    fn default() -> Self {
        Self::new(DEFAULT_COLORS)
    }
}

impl ColorPalette for CachingPalette {
    fn color(&self, key: &str) -> String {
        let mut assigned = self.assigned.borrow_mut();
        if let Some(color) = assigned.get(key) {
            return color.clone();
        }
        let color = if self.colors.is_empty() {
            String::from("#000000")
        } else {
            self.colors[assigned.len() % self.colors.len()].clone()
        };
        assigned.insert(String::from(key), color.clone());
        color
    }
}

/// Resolves bar colors: persisted per-category override first, palette default otherwise.
#[derive(Clone, Copy, Debug)]
pub struct ColorAssigner<'a> {
    palette: &'a dyn ColorPalette,
    overrides: &'a ObjectProperties,
}

impl<'a> ColorAssigner<'a> {
    /// Creates an assigner reading overrides from `overrides`.
    pub fn new(palette: &'a dyn ColorPalette, overrides: &'a ObjectProperties) -> Self {
        Self { palette, overrides }
    }

    /// Returns the color for the row identified by `key`, whose label is `category`.
    ///
    /// The palette is asked for every category even when an override exists, so
    /// adding an override never shifts the defaults of other categories.
    pub fn color_for(&self, category: &str, key: &SelectionKey) -> String {
        let default = self.palette.color(category);
        match self
            .overrides
            .get_for(key, names::COLOR_SELECTOR, names::FILL)
        {
            Some(PropertyValue::Fill(color) | PropertyValue::Text(color)) if !color.is_empty() => {
                color.clone()
            }
            Some(other) => {
                tracing::debug!(%key, value = ?other, "malformed color override, using default");
                default
            }
            None => default,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use imagebar_dataview::PrimitiveValue;

    fn key(label: &str) -> SelectionKey {
        SelectionKey::new("Region", &PrimitiveValue::from(label))
    }

    #[test]
    fn caching_palette_is_stable_per_key() {
        let palette = CachingPalette::default();
        let a = palette.color("A");
        let b = palette.color("B");
        assert_ne!(a, b);
        assert_eq!(palette.color("A"), a);
        assert_eq!(palette.assigned_len(), 2);
        assert_eq!(a, DEFAULT_COLORS[0]);
        assert_eq!(b, DEFAULT_COLORS[1]);
    }

    #[test]
    fn caching_palette_wraps_around() {
        let palette = CachingPalette::new(["red", "blue"]);
        assert_eq!(palette.color("a"), "red");
        assert_eq!(palette.color("b"), "blue");
        assert_eq!(palette.color("c"), "red");
        assert_eq!(CachingPalette::new(Vec::<String>::new()).color("x"), "#000000");
    }

    #[test]
    fn override_wins_over_palette_default() {
        let palette = CachingPalette::default();
        let mut overrides = ObjectProperties::new();
        overrides.set_for(
            &key("A"),
            names::COLOR_SELECTOR,
            names::FILL,
            PropertyValue::Fill("#123456".into()),
        );
        let assigner = ColorAssigner::new(&palette, &overrides);
        assert_eq!(assigner.color_for("A", &key("A")), "#123456");
        assert_eq!(assigner.color_for("A", &key("A")), "#123456");
        assert_eq!(assigner.color_for("B", &key("B")), DEFAULT_COLORS[1]);
    }

    #[test]
    fn malformed_override_falls_back() {
        let palette = CachingPalette::default();
        let mut overrides = ObjectProperties::new();
        overrides.set_for(&key("A"), names::COLOR_SELECTOR, names::FILL, 3.0);
        let assigner = ColorAssigner::new(&palette, &overrides);
        assert_eq!(assigner.color_for("A", &key("A")), DEFAULT_COLORS[0]);
    }
}
