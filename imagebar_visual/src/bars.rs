// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar geometry generation.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use imagebar_dataview::SelectionKey;
use kurbo::{Rect, Size};

use crate::layout::ChartLayout;
use crate::model::Model;
use crate::selection::{OpacityConfig, PointOpacity, SelectionState};

/// Reference image width of a pattern tile, in image pixels.
const PATTERN_REFERENCE_WIDTH: f64 = 1024.0;
/// Reference image height of a pattern tile, in image pixels.
const PATTERN_REFERENCE_HEIGHT: f64 = 768.0;
/// Pattern tile width, in band widths.
const PATTERN_BANDS: f64 = 4.0;
/// Minimum height of a bar's clickable area, in viewport units.
const MIN_HIT_HEIGHT: f64 = 4.0;

/// How a bar is painted.
#[derive(Clone, Debug, PartialEq)]
pub enum BarFill {
    /// A solid color, as the host formats it.
    Color(String),
    /// An image pattern.
    Image {
        /// Image URL.
        url: String,
        /// Size of one pattern tile.
        tile: Size,
    },
}

/// Render instructions for one bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    /// Row identity, for hit testing and selection.
    pub key: SelectionKey,
    /// Category label.
    pub category: String,
    /// Bar rectangle in viewport coordinates.
    pub rect: Rect,
    /// Paint.
    pub fill: BarFill,
    /// Selection hint the opacity was derived from.
    pub hint: PointOpacity,
    /// Final fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
}

/// Returns the pattern tile size for a band of `band_width`.
///
/// Tiles span four bands and keep a 1024:768 aspect ratio.
pub fn pattern_tile(band_width: f64) -> Size {
    let width = band_width * PATTERN_BANDS;
    Size::new(
        width,
        width / PATTERN_REFERENCE_WIDTH * PATTERN_REFERENCE_HEIGHT,
    )
}

/// Bar geometry derived from a bound model and its layout.
#[derive(Clone, Debug)]
pub struct BarSpec<'a> {
    /// The bound model.
    pub model: &'a Model,
    /// The layout computed for `model`.
    pub layout: &'a ChartLayout,
    /// Opacities for solid and dimmed bars.
    pub opacity: OpacityConfig,
}

impl<'a> BarSpec<'a> {
    /// Creates geometry for `model` laid out by `layout`, with default opacities.
    pub fn new(model: &'a Model, layout: &'a ChartLayout) -> Self {
        Self {
            model,
            layout,
            opacity: OpacityConfig::default(),
        }
    }

    /// Sets the solid and dimmed opacities.
    pub fn with_opacity(mut self, opacity: OpacityConfig) -> Self {
        self.opacity = opacity;
        self
    }

    /// Generates one bar per data point, in axis order.
    pub fn bars(&self, selection: &SelectionState) -> Vec<Bar> {
        let plot = self.layout.plot;
        let inner_height = plot.height();
        let scale = &self.layout.category_scale;
        let band_width = scale.band_width();
        let value_scale = self.layout.value_scale;
        let settings = &self.model.settings;
        let use_images = settings.enable_images.show && self.model.has_images;
        let opacity_percent = settings.general_view.opacity;

        self.model
            .data_points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let y = value_scale.map(point.value).clamp(0.0, inner_height);
                let x0 = plot.x0 + scale.x(i);
                let rect = Rect::new(x0, plot.y0 + y, x0 + band_width, plot.y1);
                let fill = match &point.image_url {
                    Some(url) if use_images => BarFill::Image {
                        url: url.clone(),
                        tile: pattern_tile(band_width),
                    },
                    _ => BarFill::Color(point.color.clone()),
                };
                let hint = selection.opacity_of(&point.key);
                Bar {
                    key: point.key.clone(),
                    category: point.category.clone(),
                    rect,
                    fill,
                    hint,
                    fill_opacity: self.opacity.fill_opacity(hint, opacity_percent),
                }
            })
            .collect()
    }
}

/// Recomputes bar opacities after a selection change, leaving geometry untouched.
pub fn restyle(
    bars: &mut [Bar],
    selection: &SelectionState,
    opacity: &OpacityConfig,
    opacity_percent: f64,
) {
    for bar in bars {
        bar.hint = selection.opacity_of(&bar.key);
        bar.fill_opacity = opacity.fill_opacity(bar.hint, opacity_percent);
    }
}

/// Returns the bar under `point`, if any.
///
/// A bar's clickable area spans its band horizontally and includes the plot
/// floor, and is at least a few units tall so bars at the range minimum stay
/// clickable.
pub fn hit_test(bars: &[Bar], point: kurbo::Point) -> Option<&Bar> {
    bars.iter().find(|b| {
        let r = b.rect;
        let top = r.y0.min(r.y1 - MIN_HIT_HEIGHT);
        (r.x0..r.x1).contains(&point.x) && (top..=r.y1).contains(&point.y)
    })
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
    use kurbo::Point;

    use super::*;
    use crate::color::CachingPalette;
    use crate::format::DefaultFormatterFactory;
    use crate::layout::LayoutEngine;
    use crate::model::{DataBinder, test_category};
    use crate::settings::{Settings, names};

    fn model(objects: &ObjectProperties) -> Model {
        let result = CategoricalResult::new(
            vec![test_category("Region", &["A", "B", "C"])],
            vec![
                MeasureColumn::new(
                    ColumnMetadata::new("Sales").with_role(DataRole::Value),
                    [10.into(), 5.into(), PrimitiveValue::Null],
                ),
                MeasureColumn::new(
                    ColumnMetadata::new("Flag").with_role(DataRole::ImageUrl),
                    [
                        PrimitiveValue::from("a.png"),
                        PrimitiveValue::Null,
                        PrimitiveValue::Null,
                    ],
                ),
            ],
        )
        .expect("aligned");
        let settings = Settings::resolve(objects);
        let palette = CachingPalette::default();
        DataBinder::new(&settings, objects, &palette, &DefaultFormatterFactory)
            .bind(&result, &RoleMap::new(&result))
    }

    fn layout(model: &Model) -> ChartLayout {
        LayoutEngine::new(HeuristicTextMeasurer)
            .layout(model, Size::new(400.0, 300.0))
            .expect("renderable")
    }

    #[test]
    fn bars_sit_on_the_plot_floor() {
        let m = model(&ObjectProperties::new());
        let l = layout(&m);
        let bars = BarSpec::new(&m, &l).bars(&SelectionState::Unselected);
        assert_eq!(bars.len(), 3);
        for bar in &bars {
            assert!(bar.rect.height() >= 0.0);
            assert!((bar.rect.y1 - l.plot.y1).abs() < 1e-9);
            assert!((bar.rect.width() - l.category_scale.band_width()).abs() < 1e-9);
        }
        // The maximum reaches the top of the plot.
        assert!((bars[0].rect.y0 - l.plot.y0).abs() < 1e-9);
        // The missing value is drawn at zero, below the range minimum.
        assert_eq!(bars[2].rect.height(), 0.0);
    }

    #[test]
    fn image_fill_requires_setting_and_url() {
        let m = model(&ObjectProperties::new());
        let l = layout(&m);
        let bars = BarSpec::new(&m, &l).bars(&SelectionState::Unselected);
        let bw = l.category_scale.band_width();
        assert_eq!(
            bars[0].fill,
            BarFill::Image {
                url: "a.png".into(),
                tile: pattern_tile(bw),
            }
        );
        assert!(matches!(bars[1].fill, BarFill::Color(_)));

        let off = ObjectProperties::new().with(names::ENABLE_IMAGES, names::SHOW, false);
        let m = model(&off);
        let l = layout(&m);
        let bars = BarSpec::new(&m, &l).bars(&SelectionState::Unselected);
        assert!(bars.iter().all(|b| matches!(b.fill, BarFill::Color(_))));
    }

    #[test]
    fn pattern_tiles_keep_aspect() {
        let tile = pattern_tile(50.0);
        assert_eq!(tile, Size::new(200.0, 150.0));
    }

    #[test]
    fn selection_dims_other_bars() {
        let m = model(&ObjectProperties::new().with(names::GENERAL_VIEW, names::OPACITY, 80.0));
        let l = layout(&m);
        let selected = SelectionState::from_keys([m.data_points[1].key.clone()]);
        let mut bars = BarSpec::new(&m, &l).bars(&selected);
        assert_eq!(bars[0].hint, PointOpacity::Dim);
        assert!((bars[0].fill_opacity - 0.4).abs() < 1e-9);
        assert!((bars[1].fill_opacity - 0.8).abs() < 1e-9);

        let before: Vec<Rect> = bars.iter().map(|b| b.rect).collect();
        restyle(&mut bars, &SelectionState::Unselected, &OpacityConfig::default(), 80.0);
        assert!(bars.iter().all(|b| b.hint == PointOpacity::Solid));
        assert_eq!(before, bars.iter().map(|b| b.rect).collect::<Vec<_>>());
    }

    #[test]
    fn hit_testing_finds_bars() {
        let m = model(&ObjectProperties::new());
        let l = layout(&m);
        let bars = BarSpec::new(&m, &l).bars(&SelectionState::Unselected);
        let center = bars[0].rect.center();
        assert_eq!(hit_test(&bars, center).map(|b| &b.key), Some(&bars[0].key));
        assert!(hit_test(&bars, Point::new(0.0, 0.0)).is_none());
        // Above a short bar is background.
        let above = Point::new(bars[1].rect.center().x, l.plot.y0 + 1.0);
        assert!(hit_test(&bars, above).is_none());
    }

    #[test]
    fn zero_height_bars_are_still_hit() {
        let m = model(&ObjectProperties::new());
        let l = layout(&m);
        let bars = BarSpec::new(&m, &l).bars(&SelectionState::Unselected);
        // The range minimum sits on the plot floor.
        assert_eq!(bars[1].rect.height(), 0.0);
        for y in [l.plot.y1, l.plot.y1 - 2.0] {
            let p = Point::new(bars[1].rect.center().x, y);
            assert_eq!(hit_test(&bars, p).map(|b| &b.key), Some(&bars[1].key));
        }
        // The right edge belongs to the next column.
        let edge = Point::new(bars[1].rect.x1, l.plot.y1);
        assert_ne!(hit_test(&bars, edge).map(|b| &b.key), Some(&bars[1].key));
    }
}
