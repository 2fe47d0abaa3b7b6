// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `imagebar_visual`.
//!
//! Runs one update cycle over a small flag dataset, then clicks a bar and the
//! background and prints the resulting render plans.
//! Set `RUST_LOG=imagebar_visual=debug` to see binding and selection logs.

use imagebar_dataview::{
    CategoricalResult, CategoryColumn, ColumnMetadata, DataRole, MeasureColumn,
    ObjectProperties, PrimitiveValue,
};
use imagebar_text::HeuristicTextMeasurer;
use imagebar_visual::{
    BarFill, ClickTarget, Frame, ImageBarVisual, LocalSelectionService, UpdateOptions, names,
};
use kurbo::{Point, Size};
use tracing_subscriber::EnvFilter;

const COUNTRIES: [(&str, f64, &str); 4] = [
    ("Norway", 5.4, "https://flags.example/no.png"),
    ("Chile", 19.5, "https://flags.example/cl.png"),
    ("Japan", 124.5, ""),
    ("Kenya", 55.1, "https://flags.example/ke.png"),
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let result = match sample_result() {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(%err, "invalid sample data");
            return;
        }
    };
    let objects = ObjectProperties::new()
        .with(names::VALUE_AXIS, names::SHOW_AXIS_TITLE, true)
        .with(names::GENERAL_VIEW, names::OPACITY, 90.0);

    let mut visual =
        ImageBarVisual::new(LocalSelectionService::new()).with_measurer(HeuristicTextMeasurer);
    let options = UpdateOptions {
        result: Some(result),
        objects,
        viewport: Size::new(640.0, 400.0),
    };
    visual.update(&options);
    println!("update#1:");
    print_frame(visual.frame());

    let Some(first) = visual
        .frame()
        .plan()
        .and_then(|plan| plan.bars.first())
        .map(|bar| bar.key.clone())
    else {
        return;
    };
    if let Some(items) = visual.tooltip(&first) {
        for item in items {
            println!("tooltip: {} = {}", item.display_name, item.value);
        }
    }

    let outcome = pollster::block_on(visual.click(ClickTarget::DataPoint(first)));
    println!("click bar: {outcome:?}");
    print_frame(visual.frame());

    let outcome = pollster::block_on(visual.click_at(Point::new(1.0, 1.0)));
    println!("click background: {outcome:?}");
    print_frame(visual.frame());

    for instance in visual.enumerate_objects(names::COLOR_SELECTOR) {
        println!(
            "colorSelector[{}]: {:?}",
            instance.display_name.as_deref().unwrap_or_default(),
            instance.property(names::FILL)
        );
    }

    let small = UpdateOptions {
        viewport: Size::new(80.0, 60.0),
        ..options
    };
    visual.update(&small);
    println!("update#2 (80x60):");
    print_frame(visual.frame());
}

fn sample_result() -> Result<CategoricalResult, imagebar_dataview::DataViewError> {
    let category = CategoryColumn::new(
        ColumnMetadata::new("Country.Name")
            .with_display_name("Country")
            .with_role(DataRole::Category),
        COUNTRIES.iter().map(|(name, _, _)| PrimitiveValue::from(*name)),
    );
    let population = MeasureColumn::new(
        ColumnMetadata::new("Sum(Population)")
            .with_display_name("Population (M)")
            .with_role(DataRole::Value),
        COUNTRIES.iter().map(|(_, pop, _)| PrimitiveValue::from(*pop)),
    );
    let flags = MeasureColumn::new(
        ColumnMetadata::new("First(Flag)")
            .with_display_name("Flag")
            .with_role(DataRole::ImageUrl),
        COUNTRIES.iter().map(|(_, _, url)| PrimitiveValue::from(*url)),
    );
    CategoricalResult::new(vec![category], vec![population, flags])
}

fn print_frame(frame: &Frame) {
    let Some(plan) = frame.plan() else {
        println!("  <clear>");
        return;
    };
    let layout = &plan.layout;
    println!(
        "  plot: {:?} margins: {:?} rotated: {}",
        layout.plot,
        layout.margins,
        layout.category_label_placement.is_rotated()
    );
    for bar in &plan.bars {
        let fill = match &bar.fill {
            BarFill::Color(color) => color.clone(),
            BarFill::Image { url, .. } => format!("image {url}"),
        };
        println!(
            "  {:<8} {:?} {} opacity={:.2}",
            bar.category, bar.rect, fill, bar.fill_opacity
        );
    }
    let ticks: Vec<&str> = plan.value_ticks.iter().map(|t| t.text.as_str()).collect();
    println!("  ticks: {ticks:?}");
}
