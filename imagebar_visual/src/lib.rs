// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data binding, layout and selection core for an image-textured bar chart.
//!
//! Each host update runs one cycle:
//! - **Settings** are resolved from the persisted property bag, with defaults.
//! - **Binding** turns the categorical result into a [`Model`] of colored,
//!   keyed data points and a value range.
//! - **Layout** measures axis labels, derives margins and builds the band and
//!   linear scales, or reports that the frame should be cleared.
//! - **Bars** are generated from model and layout, solid or image-patterned,
//!   with opacities taken from the current selection.
//!
//! Clicks go through a [`SelectionCoordinator`], which asks the host's
//! [`SelectionService`] to confirm before applying a new state.
//! [`ImageBarVisual`] ties all of this to one chart instance.
//!
//! Painting is out of scope; the output is a [`RenderPlan`].

#![no_std]

extern crate alloc;

mod bars;
mod color;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod format_pane;
mod layout;
mod model;
mod scale;
mod selection;
mod settings;
mod tooltip;
mod visual;

pub use bars::{Bar, BarFill, BarSpec, hit_test, pattern_tile, restyle};
pub use color::{CachingPalette, ColorAssigner, ColorPalette, DEFAULT_COLORS};
pub use format::{
    DefaultFormatterFactory, DisplayUnit, FormatOptions, LabelFormatter, LabelFormatterFactory,
};
pub use format_pane::{NumberRange, ObjectInstance, enumerate_objects};
pub use layout::{
    ChartLayout, LabelPlacement, LayoutEngine, LayoutError, LayoutOptions, Margins, TextAnchor,
};
pub use model::{BLANK_CATEGORY, DataBinder, DataPoint, Model, ValueRange, category_label};
pub use scale::{CategoryScale, ScaleBand, ScaleLinear};
pub use selection::{
    ClickOutcome, ClickTarget, LocalSelectionService, MAX_OPACITY_PERCENT, MIN_OPACITY_PERCENT,
    OpacityConfig, PointOpacity, Propagation, SelectedKeys, SelectionCoordinator, SelectionError,
    SelectionService, SelectionState, clamp_opacity,
};
pub use settings::{
    CategoryAxisSettings, DEFAULT_FONT_SIZE, DEFAULT_OPACITY, DEFAULT_PRECISION,
    GeneralViewSettings, ImageSettings, MAX_PRECISION, Settings, ValueAxisSettings, names,
};
pub use tooltip::{TooltipItem, tooltip_items};
pub use visual::{AxisLabel, Frame, ImageBarVisual, RenderPlan, UpdateOptions};

pub use imagebar_dataview as dataview;
pub use imagebar_text as text;
