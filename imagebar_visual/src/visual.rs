// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-instance update cycle.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use imagebar_dataview::{CategoricalResult, ObjectProperties, RoleMap, SelectionKey};
use imagebar_text::{HeuristicTextMeasurer, TextMeasurer};
use kurbo::{Point, Size};

use crate::bars::{self, Bar, BarSpec};
use crate::color::{CachingPalette, ColorPalette};
use crate::format::{DefaultFormatterFactory, LabelFormatterFactory};
use crate::format_pane::{ObjectInstance, enumerate_objects};
use crate::layout::{ChartLayout, LayoutEngine, LayoutOptions};
use crate::model::{DataBinder, Model};
use crate::selection::{
    ClickOutcome, ClickTarget, OpacityConfig, SelectionCoordinator, SelectionService,
    SelectionState,
};
use crate::settings::Settings;
use crate::tooltip::{TooltipItem, tooltip_items};

/// Number of value-axis ticks requested from the value scale.
const VALUE_TICK_COUNT: usize = 5;

/// Inputs of one host update.
#[derive(Clone, Debug, Default)]
pub struct UpdateOptions {
    /// The categorical result, if the host has one.
    pub result: Option<CategoricalResult>,
    /// The persisted property bag.
    pub objects: ObjectProperties,
    /// Available drawing area.
    pub viewport: Size,
}

/// A positioned axis label.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisLabel {
    /// Label text.
    pub text: String,
    /// Anchor position in viewport coordinates.
    pub position: Point,
}

/// Everything the rendering surface needs to paint one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    /// Margins, plot rectangle, scales and label placement.
    pub layout: ChartLayout,
    /// One bar per data point.
    pub bars: Vec<Bar>,
    /// Category labels at their band centers, below the plot.
    pub category_labels: Vec<AxisLabel>,
    /// Value ticks left of the plot; empty when the value axis is hidden.
    pub value_ticks: Vec<AxisLabel>,
}

/// What to show after an update.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Remove any previous drawing and draw nothing.
    Clear,
    /// Draw the plan.
    Render(Box<RenderPlan>),
}

impl Frame {
    /// The plan, when there is something to draw.
    pub fn plan(&self) -> Option<&RenderPlan> {
        match self {
            Self::Clear => None,
            Self::Render(plan) => Some(plan.as_ref()),
        }
    }

    /// Returns `true` for [`Frame::Clear`].
    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }
}

/// One chart instance: settings, model, selection and the last frame.
pub struct ImageBarVisual<S> {
    palette: Box<dyn ColorPalette>,
    measurer: Box<dyn TextMeasurer>,
    formatters: Box<dyn LabelFormatterFactory>,
    selection_service: S,
    coordinator: SelectionCoordinator,
    layout_options: LayoutOptions,
    opacity: OpacityConfig,
    settings: Settings,
    model: Option<Model>,
    frame: Frame,
}

impl<S> fmt::Debug for ImageBarVisual<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBarVisual")
            .field("palette", &self.palette)
            .field("formatters", &self.formatters)
            .field("coordinator", &self.coordinator)
            .field("layout_options", &self.layout_options)
            .field("opacity", &self.opacity)
            .field("settings", &self.settings)
            .field("model", &self.model)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<S: SelectionService> ImageBarVisual<S> {
    /// Creates an instance with the built-in palette, measurer and formatters.
    pub fn new(selection_service: S) -> Self {
        Self {
            palette: Box::new(CachingPalette::default()),
            measurer: Box::new(HeuristicTextMeasurer),
            formatters: Box::new(DefaultFormatterFactory),
            selection_service,
            coordinator: SelectionCoordinator::default(),
            layout_options: LayoutOptions::default(),
            opacity: OpacityConfig::default(),
            settings: Settings::default(),
            model: None,
            frame: Frame::Clear,
        }
    }

    /// Uses the host's palette service.
    pub fn with_palette(mut self, palette: impl ColorPalette + 'static) -> Self {
        self.palette = Box::new(palette);
        self
    }

    /// Uses the host's text measurement service.
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    /// Uses the host's label formatter factory.
    pub fn with_formatters(mut self, formatters: impl LabelFormatterFactory + 'static) -> Self {
        self.formatters = Box::new(formatters);
        self
    }

    /// Replaces the layout options.
    pub fn with_layout_options(mut self, layout_options: LayoutOptions) -> Self {
        self.layout_options = layout_options;
        self
    }

    /// Replaces the solid and dimmed opacities.
    pub fn with_opacity(mut self, opacity: OpacityConfig) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets whether the host allows selection interactions.
    pub fn with_allow_interactions(mut self, allow: bool) -> Self {
        self.coordinator.set_allow_interactions(allow);
        self
    }

    /// Runs one update cycle: resolve settings, bind, lay out and build the frame.
    pub fn update(&mut self, options: &UpdateOptions) -> &Frame {
        self.settings = Settings::resolve(&options.objects);
        let Some(result) = &options.result else {
            tracing::debug!("update without data, clearing");
            self.model = None;
            self.frame = Frame::Clear;
            return &self.frame;
        };

        let roles = RoleMap::new(result);
        let model = DataBinder::new(
            &self.settings,
            &options.objects,
            &*self.palette,
            &*self.formatters,
        )
        .bind(result, &roles);

        let engine = LayoutEngine::new(&*self.measurer).with_options(self.layout_options);
        let frame = match engine.layout(&model, options.viewport) {
            Ok(layout) => Frame::Render(Box::new(self.plan(&model, layout))),
            Err(err) => {
                tracing::debug!(%err, "frame not renderable, clearing");
                Frame::Clear
            }
        };
        tracing::debug!(
            points = model.data_points.len(),
            width = options.viewport.width,
            height = options.viewport.height,
            clear = frame.is_clear(),
            "update"
        );
        self.model = Some(model);
        self.frame = frame;
        &self.frame
    }

    fn plan(&self, model: &Model, layout: ChartLayout) -> RenderPlan {
        let bars = BarSpec::new(model, &layout)
            .with_opacity(self.opacity)
            .bars(self.coordinator.state());
        let plot = layout.plot;
        let tick_padding = self.layout_options.tick_padding;

        let category_labels = if model.settings.category_axis.show {
            layout
                .category_labels
                .iter()
                .enumerate()
                .map(|(i, text)| AxisLabel {
                    text: text.clone(),
                    position: Point::new(
                        plot.x0 + layout.category_scale.center(i),
                        plot.y1 + tick_padding,
                    ),
                })
                .collect()
        } else {
            Vec::new()
        };

        let value_ticks = if model.settings.value_axis.show {
            layout
                .value_scale
                .ticks(VALUE_TICK_COUNT)
                .into_iter()
                .map(|t| AxisLabel {
                    text: model.value_label_formatter.format_number(t),
                    position: Point::new(
                        plot.x0 - tick_padding,
                        plot.y0 + layout.value_scale.map(t),
                    ),
                })
                .collect()
        } else {
            Vec::new()
        };

        RenderPlan {
            layout,
            bars,
            category_labels,
            value_ticks,
        }
    }

    /// Routes a click and restyles the current frame from the resulting selection.
    ///
    /// Bar opacities are updated in the same call that applies the confirmed
    /// selection, so a frame never mixes old and new selection states.
    pub async fn click(&mut self, target: ClickTarget) -> ClickOutcome {
        let outcome = self
            .coordinator
            .click(&self.selection_service, target)
            .await;
        if outcome.changed {
            self.restyle();
        }
        outcome
    }

    /// Clicks whatever is under `position`: a bar, or the background.
    pub async fn click_at(&mut self, position: Point) -> ClickOutcome {
        let target = self
            .frame
            .plan()
            .and_then(|plan| bars::hit_test(&plan.bars, position))
            .map_or(ClickTarget::Background, |bar| {
                ClickTarget::DataPoint(bar.key.clone())
            });
        self.click(target).await
    }

    /// Recomputes bar opacities of the current frame from the selection state.
    pub fn restyle(&mut self) {
        if let Frame::Render(plan) = &mut self.frame {
            bars::restyle(
                &mut plan.bars,
                self.coordinator.state(),
                &self.opacity,
                self.settings.general_view.opacity,
            );
        }
    }

    /// The current selection.
    pub fn selection(&self) -> &SelectionState {
        self.coordinator.state()
    }

    /// Updates the host's interaction flag.
    pub fn set_allow_interactions(&mut self, allow: bool) {
        self.coordinator.set_allow_interactions(allow);
    }

    /// The settings of the last update.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The model of the last update, if it had data.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// The frame of the last update.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// The selection service.
    pub fn selection_service(&self) -> &S {
        &self.selection_service
    }

    /// Tooltip lines for the point identified by `key`.
    pub fn tooltip(&self, key: &SelectionKey) -> Option<Vec<TooltipItem>> {
        let model = self.model.as_ref()?;
        model.point(key).map(|point| tooltip_items(model, point))
    }

    /// Format-pane instances of `object_name` for the current settings and model.
    pub fn enumerate_objects(&self, object_name: &str) -> Vec<ObjectInstance> {
        enumerate_objects(object_name, &self.settings, self.model.as_ref())
    }
}
