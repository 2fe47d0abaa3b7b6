// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tooltip content for a hovered bar.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::model::{DataPoint, Model};

/// One line of a tooltip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipItem {
    /// Field name.
    pub display_name: String,
    /// Formatted field value.
    pub value: String,
    /// Swatch color, when the line describes the bar itself.
    pub color: Option<String>,
}

/// Builds the tooltip lines for `point`: its category, then its formatted value.
pub fn tooltip_items(model: &Model, point: &DataPoint) -> Vec<TooltipItem> {
    let category_name = model
        .category_metadata
        .as_ref()
        .map_or("Category", |m| m.display_name.as_str());
    let value_name = model
        .value_metadata
        .as_ref()
        .map_or("Value", |m| m.display_name.as_str());
    alloc::vec![
        TooltipItem {
            display_name: String::from(category_name),
            value: model.format_category(point),
            color: None,
        },
        TooltipItem {
            display_name: String::from(value_name),
            value: model.value_label_formatter.format_number(point.value),
            color: Some(point.color.clone()),
        },
    ]
}
