// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Margin measurement, scale construction and label rotation.
//!
//! Layout runs in two measure steps:
//! - **Axes**: the left margin fits the formatted value-axis boundary labels,
//!   the bottom margin fits one line of category labels (plus titles).
//! - **Labels**: once the category scale exists, labels that do not fit their
//!   band switch every label to a rotated placement, which may grow the bottom
//!   margin. The category scale is not rebuilt; only the plot height changes.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use imagebar_text::TextMeasurer;
use kurbo::{Rect, Size};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::model::Model;
use crate::scale::{CategoryScale, ScaleLinear};

/// Representative text used to size a horizontal category label row.
const SAMPLE_LABEL: &str = "Mg";

/// Reasons a model cannot be laid out.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The viewport is below the minimum usable size.
    #[error("viewport {width}x{height} is below the minimum usable size")]
    DegenerateViewport {
        /// Viewport width.
        width: f64,
        /// Viewport height.
        height: f64,
    },
    /// The model has no data points or no value range.
    #[error("model has nothing to draw")]
    EmptyModel,
    /// Margins consume the whole viewport.
    #[error("margins leave no plot area")]
    NoPlotArea,
}

/// Tunables for [`LayoutEngine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    /// Viewports smaller than this in either dimension are not renderable.
    pub min_viewport: Size,
    /// Gap between bands, as a fraction of the band width.
    pub band_padding_inner: f64,
    /// Gap before the first and after the last band, as a fraction of the band width.
    pub band_padding_outer: f64,
    /// Gap between the plot edge and axis labels.
    pub tick_padding: f64,
    /// Extra room reserved around axis labels.
    pub label_padding: f64,
    /// Gap between axis labels and the axis title.
    pub title_offset: f64,
    /// Rotation applied to category labels that do not fit, in degrees.
    pub rotation_degrees: f64,
    /// Horizontal offset of rotated labels, in ems.
    pub rotated_dx_em: f64,
    /// Largest share of the viewport height rotated labels may claim.
    pub rotated_margin_cap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_viewport: Size::new(100.0, 100.0),
            band_padding_inner: 0.1,
            band_padding_outer: 0.0,
            tick_padding: 6.0,
            label_padding: 4.0,
            title_offset: 6.0,
            rotation_degrees: -35.0,
            rotated_dx_em: -0.8,
            rotated_margin_cap: 0.4,
        }
    }
}

impl LayoutOptions {
    /// Sets the minimum renderable viewport.
    pub fn with_min_viewport(mut self, min_viewport: Size) -> Self {
        self.min_viewport = min_viewport;
        self
    }

    /// Sets inner and outer band padding.
    pub fn with_band_padding(mut self, inner: f64, outer: f64) -> Self {
        self.band_padding_inner = inner.max(0.0);
        self.band_padding_outer = outer.max(0.0);
        self
    }

    /// Sets the rotation used for labels that do not fit.
    pub fn with_rotation_degrees(mut self, rotation_degrees: f64) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }
}

/// Space reserved around the plot area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    /// Above the plot.
    pub top: f64,
    /// Right of the plot.
    pub right: f64,
    /// Below the plot (category axis).
    pub bottom: f64,
    /// Left of the plot (value axis).
    pub left: f64,
}

/// Horizontal text anchor of a label relative to its position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the position.
    Start,
    /// Text is centered on the position.
    Middle,
    /// Text ends at the position.
    End,
}

/// How category labels are placed below their bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Rotation in degrees; `0` for horizontal labels.
    pub angle_degrees: f64,
    /// Anchor at the band center.
    pub anchor: TextAnchor,
    /// Horizontal offset applied before rotation.
    pub dx: f64,
}

impl LabelPlacement {
    /// Centered, unrotated labels.
    pub fn horizontal() -> Self {
        Self {
            angle_degrees: 0.0,
            anchor: TextAnchor::Middle,
            dx: 0.0,
        }
    }

    /// End-anchored labels rotated by `angle_degrees`.
    pub fn rotated(angle_degrees: f64, dx: f64) -> Self {
        Self {
            angle_degrees,
            anchor: TextAnchor::End,
            dx,
        }
    }

    /// Returns `true` for rotated placements.
    pub fn is_rotated(&self) -> bool {
        self.angle_degrees != 0.0
    }
}

/// The result of a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    /// The viewport the layout was computed for.
    pub viewport: Size,
    /// Reserved margins.
    pub margins: Margins,
    /// The plot rectangle in viewport coordinates.
    pub plot: Rect,
    /// Category positions over `[0, plot width]`.
    pub category_scale: CategoryScale,
    /// Value positions over `[plot height, 0]`.
    pub value_scale: ScaleLinear,
    /// Placement shared by every category label.
    pub category_label_placement: LabelPlacement,
    /// Formatted category label text, in axis order.
    pub category_labels: Vec<String>,
    /// Category axis title, when shown.
    pub category_title: Option<String>,
    /// Value axis title, when shown.
    pub value_title: Option<String>,
}

impl ChartLayout {
    /// Width of the plot area.
    pub fn inner_width(&self) -> f64 {
        self.plot.width()
    }

    /// Height of the plot area.
    pub fn inner_height(&self) -> f64 {
        self.plot.height()
    }
}

/// Computes margins and scales for a model.
#[derive(Clone, Debug)]
pub struct LayoutEngine<M> {
    measurer: M,
    options: LayoutOptions,
}

impl<M: TextMeasurer> LayoutEngine<M> {
    /// Creates an engine with default options.
    pub fn new(measurer: M) -> Self {
        Self {
            measurer,
            options: LayoutOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in use.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lays out `model` inside `viewport`.
    pub fn layout(&self, model: &Model, viewport: Size) -> Result<ChartLayout, LayoutError> {
        let opts = &self.options;
        if viewport.is_nan()
            || viewport.width < opts.min_viewport.width
            || viewport.height < opts.min_viewport.height
        {
            return Err(LayoutError::DegenerateViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let range = match model.range {
            Some(range) if !model.data_points.is_empty() => range,
            _ => return Err(LayoutError::EmptyModel),
        };
        let settings = &model.settings;
        let cat_axis = &settings.category_axis;
        let val_axis = &settings.value_axis;

        let value_title = (val_axis.show && val_axis.show_title).then(|| {
            axis_title(
                &val_axis.title,
                model.value_metadata.as_ref().map(|m| m.display_name.as_str()),
            )
        });
        let category_title = (cat_axis.show && cat_axis.show_title).then(|| {
            axis_title(
                &cat_axis.title,
                model.category_metadata.as_ref().map(|m| m.display_name.as_str()),
            )
        });

        let mut margins = Margins::default();
        if val_axis.show {
            let lo = model.value_label_formatter.format_number(range.min);
            let hi = model.value_label_formatter.format_number(range.max);
            let widest = self
                .measurer
                .measure_width(&lo, val_axis.font_size)
                .max(self.measurer.measure_width(&hi, val_axis.font_size));
            margins.left = widest + opts.tick_padding + opts.label_padding;
            if let Some(title) = &value_title {
                margins.left += self.title_extent(title, val_axis.font_size);
            }
        }

        let category_labels: Vec<String> = model
            .data_points
            .iter()
            .map(|p| model.format_category(p))
            .collect();

        let inner_width = viewport.width - margins.left - margins.right;
        if inner_width <= 0.0 {
            return Err(LayoutError::NoPlotArea);
        }
        let category_scale = CategoryScale::new(
            model.data_points.iter().map(|p| p.category.clone()).collect(),
            (0.0, inner_width),
            opts.band_padding_inner,
            opts.band_padding_outer,
        );

        let mut placement = LabelPlacement::horizontal();
        if cat_axis.show {
            let band = category_scale.band_width();
            let fits = category_labels
                .iter()
                .all(|l| self.measurer.measure_width(l, cat_axis.font_size) <= band);
            let line = self.measurer.measure_height(SAMPLE_LABEL, cat_axis.font_size);
            let mut label_extent = line;
            if !fits {
                placement = LabelPlacement::rotated(
                    opts.rotation_degrees,
                    opts.rotated_dx_em * cat_axis.font_size,
                );
                let cap = viewport.height * opts.rotated_margin_cap;
                let rotated = self.rotated_extent(&category_labels, cat_axis.font_size);
                label_extent = label_extent.max(rotated.min(cap));
            }
            margins.bottom = label_extent + opts.tick_padding + opts.label_padding;
            if let Some(title) = &category_title {
                margins.bottom += self.title_extent(title, cat_axis.font_size);
            }
        }

        let inner_height = viewport.height - margins.top - margins.bottom;
        if inner_height <= 0.0 {
            return Err(LayoutError::NoPlotArea);
        }

        let plot = Rect::new(
            margins.left,
            margins.top,
            margins.left + inner_width,
            margins.top + inner_height,
        );
        tracing::trace!(
            left = margins.left,
            bottom = margins.bottom,
            band = category_scale.band_width(),
            rotated = placement.is_rotated(),
            "layout"
        );
        Ok(ChartLayout {
            viewport,
            margins,
            plot,
            category_scale,
            value_scale: ScaleLinear::new((range.min, range.max), (inner_height, 0.0)),
            category_label_placement: placement,
            category_labels,
            category_title,
            value_title,
        })
    }

    fn title_extent(&self, title: &str, font_size: f64) -> f64 {
        self.measurer.measure_height(title, font_size) + self.options.title_offset
    }

    /// Vertical extent of the tallest label after rotation.
    fn rotated_extent(&self, labels: &[String], font_size: f64) -> f64 {
        let theta = self.options.rotation_degrees.to_radians();
        let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
        labels
            .iter()
            .map(|l| {
                let w = self.measurer.measure_width(l, font_size);
                let h = self.measurer.measure_height(l, font_size);
                sin * w + cos * h
            })
            .fold(0.0, f64::max)
    }
}

fn axis_title(explicit: &str, column: Option<&str>) -> String {
    if explicit.is_empty() {
        String::from(column.unwrap_or(""))
    } else {
        String::from(explicit)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use imagebar_dataview::{
        CategoricalResult, ColumnMetadata, DataRole, MeasureColumn, ObjectProperties,
        PrimitiveValue, RoleMap,
    };
    use imagebar_text::HeuristicTextMeasurer;

    use super::*;
    use crate::color::CachingPalette;
    use crate::format::DefaultFormatterFactory;
    use crate::model::{DataBinder, test_category};
    use crate::settings::{Settings, names};

    fn model(labels: &[&str], values: &[f64], objects: &ObjectProperties) -> Model {
        let result = CategoricalResult::new(
            vec![test_category("Region", labels)],
            vec![MeasureColumn::new(
                ColumnMetadata::new("Sales")
                    .with_display_name("Sales")
                    .with_role(DataRole::Value),
                values.iter().map(|v| PrimitiveValue::from(*v)),
            )],
        )
        .expect("aligned");
        let settings = Settings::resolve(objects);
        let palette = CachingPalette::default();
        DataBinder::new(&settings, objects, &palette, &DefaultFormatterFactory)
            .bind(&result, &RoleMap::new(&result))
    }

    fn engine() -> LayoutEngine<HeuristicTextMeasurer> {
        LayoutEngine::new(HeuristicTextMeasurer)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn margins_fit_boundary_labels() {
        let m = model(&["A", "B", "C"], &[10.0, 5.0, 20.0], &ObjectProperties::new());
        let layout = engine().layout(&m, Size::new(400.0, 300.0)).expect("renderable");
        // "20.00" is 5 glyphs at 0.6em of 12px; plus tick and label padding.
        assert!(approx(layout.margins.left, 36.0 + 6.0 + 4.0));
        // One 12px line plus tick and label padding.
        assert!(approx(layout.margins.bottom, 12.0 + 6.0 + 4.0));
        assert!(approx(layout.inner_width(), 354.0));
        assert!(approx(layout.value_scale.map(20.0), 0.0));
        assert!(approx(layout.value_scale.map(5.0), layout.inner_height()));
        assert!(!layout.category_label_placement.is_rotated());
        assert_eq!(layout.category_label_placement.anchor, TextAnchor::Middle);
    }

    #[test]
    fn hidden_axes_take_no_margin() {
        let objects = ObjectProperties::new()
            .with(names::CATEGORY_AXIS, names::SHOW, false)
            .with(names::VALUE_AXIS, names::SHOW, false);
        let m = model(&["A"], &[1.0], &objects);
        let layout = engine().layout(&m, Size::new(200.0, 200.0)).expect("renderable");
        assert_eq!(layout.margins, Margins::default());
        assert_eq!(layout.plot, Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn small_viewport_is_not_renderable() {
        let m = model(&["A"], &[1.0], &ObjectProperties::new());
        assert_eq!(
            engine().layout(&m, Size::new(50.0, 50.0)),
            Err(LayoutError::DegenerateViewport {
                width: 50.0,
                height: 50.0
            })
        );
    }

    #[test]
    fn empty_model_is_not_renderable() {
        let m = model(&["A", "B"], &[f64::NAN, f64::NAN], &ObjectProperties::new());
        assert_eq!(
            engine().layout(&m, Size::new(400.0, 300.0)),
            Err(LayoutError::EmptyModel)
        );
    }

    #[test]
    fn one_wide_label_rotates_every_label() {
        let m = model(
            &["A", "A very long category", "C"],
            &[1.0, 2.0, 3.0],
            &ObjectProperties::new(),
        );
        let layout = engine().layout(&m, Size::new(200.0, 300.0)).expect("renderable");
        let placement = layout.category_label_placement;
        assert!(placement.is_rotated());
        assert_eq!(placement.angle_degrees, -35.0);
        assert_eq!(placement.anchor, TextAnchor::End);
        assert!(approx(placement.dx, -0.8 * 12.0));

        let theta = 35.0_f64.to_radians();
        let extent = theta.sin() * 20.0 * 7.2 + theta.cos() * 12.0;
        assert!(approx(layout.margins.bottom, extent + 10.0));
    }

    #[test]
    fn rotated_margin_is_capped() {
        let long = "x".repeat(200);
        let m = model(&[long.as_str(), "B"], &[1.0, 2.0], &ObjectProperties::new());
        let layout = engine().layout(&m, Size::new(150.0, 200.0)).expect("renderable");
        assert!(approx(layout.margins.bottom, 0.4 * 200.0 + 10.0));
    }

    #[test]
    fn titles_add_to_margins() {
        let objects = ObjectProperties::new()
            .with(names::VALUE_AXIS, names::SHOW_AXIS_TITLE, true)
            .with(names::CATEGORY_AXIS, names::SHOW_AXIS_TITLE, true)
            .with(names::CATEGORY_AXIS, names::TITLE, "Regions");
        let m = model(&["A"], &[1.0], &objects);
        let layout = engine().layout(&m, Size::new(400.0, 300.0)).expect("renderable");
        assert_eq!(layout.value_title.as_deref(), Some("Sales"));
        assert_eq!(layout.category_title.as_deref(), Some("Regions"));
        assert!(approx(layout.margins.bottom, 22.0 + 12.0 + 6.0));
    }

    #[test]
    fn wide_value_labels_can_exhaust_the_plot() {
        let objects = ObjectProperties::new().with(names::VALUE_AXIS, names::DISPLAY_UNITS, 1.0);
        let m = model(&["A"], &[1e20], &objects);
        assert_eq!(
            engine().layout(&m, Size::new(100.0, 100.0)),
            Err(LayoutError::NoPlotArea)
        );
    }
}
