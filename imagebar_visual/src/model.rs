// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding a categorical result into a render-ready [`Model`].

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use imagebar_dataview::{
    CategoricalResult, ColumnMetadata, DataRole, MeasureColumn, ObjectProperties, PrimitiveValue,
    RoleMap, SelectionKey,
};

use crate::color::{ColorAssigner, ColorPalette};
use crate::format::{FormatOptions, LabelFormatter, LabelFormatterFactory};
use crate::settings::{Settings, ValueAxisSettings};

/// Label used for a missing category cell.
pub const BLANK_CATEGORY: &str = "(Blank)";

static MISSING: PrimitiveValue = PrimitiveValue::Null;

/// One bar: a category row with its value, optional image and color.
#[derive(Clone, Debug, PartialEq)]
pub struct DataPoint {
    /// Display label of the category row.
    pub category: String,
    /// The raw category cell, formatted for axis labels and tooltips.
    pub category_value: PrimitiveValue,
    /// Primary measure; `0` when unmapped or not a finite number.
    pub value: f64,
    /// Image URL used to texture the bar, when one is mapped for this row.
    pub image_url: Option<String>,
    /// Resolved fill color.
    pub color: String,
    /// Stable identity of the source row.
    pub key: SelectionKey,
}

/// The closed range spanning every numeric value (after explicit bounds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValueRange {
    /// Applies explicit axis bounds to an observed range.
    ///
    /// An explicit minimum is honored only if it is below the observed maximum,
    /// and an explicit maximum only if it is above the observed minimum. Each
    /// bound is checked on its own, so two valid bounds may still cross.
    pub fn with_explicit_bounds(self, axis: &ValueAxisSettings) -> Self {
        let min = match axis.min_value {
            Some(m) if m < self.max => m,
            _ => self.min,
        };
        let max = match axis.max_value {
            Some(m) if m > self.min => m,
            _ => self.max,
        };
        Self { min, max }
    }

    /// The larger absolute bound, used to pick automatic display units.
    pub fn magnitude(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

/// The render-ready snapshot of one update cycle.
#[derive(Clone, Debug)]
pub struct Model {
    /// One point per category row, in source order.
    pub data_points: Vec<DataPoint>,
    /// Value range; `None` when no row has a numeric value.
    pub range: Option<ValueRange>,
    /// Settings snapshot the model was bound with.
    pub settings: Settings,
    /// Formats value-axis labels and tooltip values.
    pub value_label_formatter: LabelFormatter,
    /// Formats category-axis labels.
    pub category_label_formatter: LabelFormatter,
    /// Metadata of the category column, when present.
    pub category_metadata: Option<ColumnMetadata>,
    /// Metadata of the value-role measure, when mapped.
    pub value_metadata: Option<ColumnMetadata>,
    /// Whether at least one point carries an image URL.
    pub has_images: bool,
}

impl Model {
    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty() || self.range.is_none()
    }

    /// Lower bound of the value range.
    pub fn min_value(&self) -> Option<f64> {
        self.range.map(|r| r.min)
    }

    /// Upper bound of the value range.
    pub fn max_value(&self) -> Option<f64> {
        self.range.map(|r| r.max)
    }

    /// Looks up the point identified by `key`.
    pub fn point(&self, key: &SelectionKey) -> Option<&DataPoint> {
        self.data_points.iter().find(|p| &p.key == key)
    }

    /// Formats the category of `point` with the category-axis formatter.
    ///
    /// Blank cells keep the [`BLANK_CATEGORY`] label.
    pub fn format_category(&self, point: &DataPoint) -> String {
        match point.category_value {
            PrimitiveValue::Null => String::from(BLANK_CATEGORY),
            ref cell => self.category_label_formatter.format(cell),
        }
    }
}

/// Where each row reads its value (and possibly its image) from.
enum ValueSource<'r> {
    Unmapped,
    Column(&'r MeasureColumn),
    /// Row `i` reads the `i`-th value column; the column's group name is the image URL.
    GroupedByImage(Vec<&'r MeasureColumn>),
}

/// Converts a categorical result into a [`Model`].
#[derive(Clone, Copy, Debug)]
pub struct DataBinder<'a> {
    settings: &'a Settings,
    objects: &'a ObjectProperties,
    palette: &'a dyn ColorPalette,
    formatters: &'a dyn LabelFormatterFactory,
}

impl<'a> DataBinder<'a> {
    /// Creates a binder for one update cycle.
    pub fn new(
        settings: &'a Settings,
        objects: &'a ObjectProperties,
        palette: &'a dyn ColorPalette,
        formatters: &'a dyn LabelFormatterFactory,
    ) -> Self {
        Self {
            settings,
            objects,
            palette,
            formatters,
        }
    }

    /// Binds `result`, using `roles` to locate the value and image measures.
    ///
    /// Missing categories produce an empty model, never an error.
    pub fn bind(&self, result: &CategoricalResult, roles: &RoleMap) -> Model {
        let Some(category) = result.category().filter(|c| !c.values.is_empty()) else {
            tracing::debug!("categorical result has no category rows");
            return self.empty_model(result.category().map(|c| c.source.clone()), None);
        };
        let rows = category.values.len();

        let image_column = roles
            .first(DataRole::ImageUrl)
            .and_then(|i| result.measure(i));
        let value_columns: Vec<&MeasureColumn> = roles
            .all(DataRole::Value)
            .iter()
            .filter_map(|&i| result.measure(i))
            .collect();
        let source = value_source(image_column.is_some(), value_columns, rows);
        let value_metadata = match &source {
            ValueSource::Unmapped => None,
            ValueSource::Column(c) => Some(c.source.clone()),
            ValueSource::GroupedByImage(cols) => cols.first().map(|c| c.source.clone()),
        };

        let assigner = ColorAssigner::new(self.palette, self.objects);
        let mut data_points = Vec::with_capacity(rows);
        let mut observed: Option<ValueRange> = None;
        for (row, cell) in category.values.iter().enumerate() {
            let label = category_label(cell);
            let (value_cell, series_image) = match &source {
                ValueSource::Unmapped => (&MISSING, None),
                ValueSource::Column(c) => (c.value(row), None),
                ValueSource::GroupedByImage(cols) => {
                    let c = cols[row];
                    (c.value(row), c.source.group_name.as_ref())
                }
            };
            let value = value_cell.as_finite_f64();
            if let Some(v) = value {
                observed = Some(match observed {
                    Some(r) => ValueRange {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                    None => ValueRange { min: v, max: v },
                });
            }
            let image_url = image_column
                .map(|c| c.value(row))
                .or(series_image)
                .and_then(image_url_of);
            let key = SelectionKey::for_category(category, row);
            let color = assigner.color_for(&label, &key);
            data_points.push(DataPoint {
                category: label,
                category_value: cell.clone(),
                value: value.unwrap_or(0.0),
                image_url,
                color,
                key,
            });
        }

        let range = observed.map(|r| r.with_explicit_bounds(&self.settings.value_axis));
        tracing::debug!(rows, ?observed, ?range, "bound categorical result");

        let has_images = data_points.iter().any(|p| p.image_url.is_some());
        let mut model = self.empty_model(Some(category.source.clone()), value_metadata);
        model.value_label_formatter = self.value_formatter(
            model.value_metadata.as_ref(),
            range.map_or(0.0, |r| r.magnitude()),
        );
        model.data_points = data_points;
        model.range = range;
        model.has_images = has_images;
        model
    }

    fn empty_model(
        &self,
        category_metadata: Option<ColumnMetadata>,
        value_metadata: Option<ColumnMetadata>,
    ) -> Model {
        let axis = &self.settings.category_axis;
        let category_label_formatter = self.formatters.create(
            &FormatOptions::new(axis.precision)
                .with_format(category_metadata.as_ref().and_then(|m| m.format.clone()))
                .with_display_units(axis.display_units),
        );
        Model {
            data_points: Vec::new(),
            range: None,
            settings: self.settings.clone(),
            value_label_formatter: self.value_formatter(value_metadata.as_ref(), 0.0),
            category_label_formatter,
            category_metadata,
            value_metadata,
            has_images: false,
        }
    }

    fn value_formatter(&self, metadata: Option<&ColumnMetadata>, reference: f64) -> LabelFormatter {
        let axis = &self.settings.value_axis;
        self.formatters.create(
            &FormatOptions::new(axis.precision)
                .with_format(metadata.and_then(|m| m.format.clone()))
                .with_display_units(axis.display_units)
                .with_reference(reference),
        )
    }
}

fn value_source<'r>(
    has_image_column: bool,
    value_columns: Vec<&'r MeasureColumn>,
    rows: usize,
) -> ValueSource<'r> {
    let grouped = !has_image_column
        && value_columns.len() > 1
        && value_columns.len() == rows
        && value_columns.iter().all(|c| c.source.group_name.is_some());
    if grouped {
        return ValueSource::GroupedByImage(value_columns);
    }
    match value_columns.first() {
        Some(&c) => ValueSource::Column(c),
        None => ValueSource::Unmapped,
    }
}

/// The display label of a category cell.
pub fn category_label(cell: &PrimitiveValue) -> String {
    match cell {
        PrimitiveValue::Null => String::from(BLANK_CATEGORY),
        other => other.to_string(),
    }
}

fn image_url_of(cell: &PrimitiveValue) -> Option<String> {
    cell.as_text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
pub(crate) fn test_category(name: &str, labels: &[&str]) -> imagebar_dataview::CategoryColumn {
    imagebar_dataview::CategoryColumn::new(
        ColumnMetadata::new(name)
            .with_display_name(name)
            .with_role(DataRole::Category),
        labels.iter().map(|l| PrimitiveValue::from(*l)),
    )
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::color::CachingPalette;
    use crate::format::DefaultFormatterFactory;
    use crate::settings::names;
    use imagebar_dataview::CategoryColumn;

    fn values(name: &str, cells: &[PrimitiveValue]) -> MeasureColumn {
        MeasureColumn::new(
            ColumnMetadata::new(name)
                .with_display_name(name)
                .with_role(DataRole::Value),
            cells.iter().cloned(),
        )
    }

    fn bind_with(result: &CategoricalResult, objects: &ObjectProperties) -> Model {
        let settings = Settings::resolve(objects);
        let palette = CachingPalette::default();
        DataBinder::new(&settings, objects, &palette, &DefaultFormatterFactory)
            .bind(result, &RoleMap::new(result))
    }

    fn bind(result: &CategoricalResult) -> Model {
        bind_with(result, &ObjectProperties::new())
    }

    fn abc(cells: &[PrimitiveValue]) -> CategoricalResult {
        CategoricalResult::new(
            vec![test_category("Region", &["A", "B", "C"])],
            vec![values("Sales", cells)],
        )
        .expect("aligned")
    }

    #[test]
    fn binds_one_point_per_row_in_order() {
        let model = bind(&abc(&[10.into(), 5.into(), 20.into()]));
        let labels: Vec<_> = model.data_points.iter().map(|p| p.category.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(model.min_value(), Some(5.0));
        assert_eq!(model.max_value(), Some(20.0));
        assert!(model.data_points.iter().all(|p| p.image_url.is_none()));
        assert!(!model.has_images);
        assert!(!model.is_empty());
    }

    #[test]
    fn unmapped_value_role_yields_zero_values_and_no_range() {
        let result =
            CategoricalResult::new(vec![test_category("Region", &["A", "B"])], vec![]).expect("ok");
        let model = bind(&result);
        assert_eq!(model.data_points.len(), 2);
        assert!(model.data_points.iter().all(|p| p.value == 0.0));
        assert_eq!(model.range, None);
        assert!(model.is_empty());
    }

    #[test]
    fn missing_categories_yield_an_empty_model() {
        let model = bind(&CategoricalResult::empty());
        assert!(model.data_points.is_empty());
        assert!(model.is_empty());

        let result = CategoricalResult::new(vec![test_category("Region", &[])], vec![])
            .expect("empty column");
        assert!(bind(&result).data_points.is_empty());
    }

    #[test]
    fn non_numeric_cells_are_zero_and_skip_the_range() {
        let model = bind(&abc(&[
            PrimitiveValue::from("12"),
            PrimitiveValue::Number(f64::NAN),
            8.into(),
        ]));
        assert_eq!(model.data_points[0].value, 0.0);
        assert_eq!(model.data_points[1].value, 0.0);
        assert_eq!(model.range, Some(ValueRange { min: 8.0, max: 8.0 }));
    }

    #[test]
    fn explicit_bounds_apply_only_when_they_do_not_invert() {
        let cells = [10.into(), 5.into(), 20.into()];
        let objects = ObjectProperties::new()
            .with(names::VALUE_AXIS, names::MIN_VALUE, 0.0)
            .with(names::VALUE_AXIS, names::MAX_VALUE, 50.0);
        let model = bind_with(&abc(&cells), &objects);
        assert_eq!(model.range, Some(ValueRange { min: 0.0, max: 50.0 }));

        let objects = ObjectProperties::new()
            .with(names::VALUE_AXIS, names::MIN_VALUE, 25.0)
            .with(names::VALUE_AXIS, names::MAX_VALUE, 2.0);
        let model = bind_with(&abc(&cells), &objects);
        assert_eq!(model.range, Some(ValueRange { min: 5.0, max: 20.0 }));
    }

    #[test]
    fn explicit_bounds_equal_to_the_opposite_extreme_are_ignored() {
        let cells = [10.into(), 5.into(), 20.into()];
        let objects = ObjectProperties::new().with(names::VALUE_AXIS, names::MIN_VALUE, 20.0);
        let model = bind_with(&abc(&cells), &objects);
        assert_eq!(model.range, Some(ValueRange { min: 5.0, max: 20.0 }));

        let objects = ObjectProperties::new().with(names::VALUE_AXIS, names::MAX_VALUE, 5.0);
        let model = bind_with(&abc(&cells), &objects);
        assert_eq!(model.range, Some(ValueRange { min: 5.0, max: 20.0 }));

        // Just inside the observed range, both apply.
        let objects = ObjectProperties::new()
            .with(names::VALUE_AXIS, names::MIN_VALUE, 19.5)
            .with(names::VALUE_AXIS, names::MAX_VALUE, 5.5);
        let model = bind_with(&abc(&cells), &objects);
        assert_eq!(model.range, Some(ValueRange { min: 19.5, max: 5.5 }));
    }

    #[test]
    fn individually_valid_bounds_may_cross() {
        let cells = [10.into(), 5.into(), 20.into()];
        let objects = ObjectProperties::new()
            .with(names::VALUE_AXIS, names::MIN_VALUE, 15.0)
            .with(names::VALUE_AXIS, names::MAX_VALUE, 8.0);
        let model = bind_with(&abc(&cells), &objects);
        assert_eq!(model.range, Some(ValueRange { min: 15.0, max: 8.0 }));
    }

    #[test]
    fn image_role_populates_urls() {
        let image = MeasureColumn::new(
            ColumnMetadata::new("Flag").with_role(DataRole::ImageUrl),
            [
                PrimitiveValue::from("https://example.com/a.png"),
                PrimitiveValue::Null,
                PrimitiveValue::from("  "),
            ],
        );
        let result = CategoricalResult::new(
            vec![test_category("Region", &["A", "B", "C"])],
            vec![image, values("Sales", &[1.into(), 2.into(), 3.into()])],
        )
        .expect("aligned");
        let model = bind(&result);
        assert_eq!(
            model.data_points[0].image_url.as_deref(),
            Some("https://example.com/a.png")
        );
        assert_eq!(model.data_points[1].image_url, None);
        assert_eq!(model.data_points[2].image_url, None);
        assert!(model.has_images);
    }

    #[test]
    fn grouped_value_columns_carry_images() {
        let grouped = |i: usize, url: &str, v: f64| {
            let mut cells = vec![PrimitiveValue::Null; 2];
            cells[i] = v.into();
            MeasureColumn::new(
                ColumnMetadata::new("Sales")
                    .with_role(DataRole::Value)
                    .with_group_name(url),
                cells,
            )
        };
        let result = CategoricalResult::new(
            vec![test_category("Region", &["A", "B"])],
            vec![grouped(0, "a.png", 3.0), grouped(1, "b.png", 7.0)],
        )
        .expect("aligned");
        let model = bind(&result);
        assert_eq!(model.data_points[0].value, 3.0);
        assert_eq!(model.data_points[1].value, 7.0);
        assert_eq!(model.data_points[1].image_url.as_deref(), Some("b.png"));
        assert_eq!(model.range, Some(ValueRange { min: 3.0, max: 7.0 }));
    }

    #[test]
    fn blank_categories_get_a_label() {
        let category = CategoryColumn::new(
            ColumnMetadata::new("Year"),
            [PrimitiveValue::from(2024), PrimitiveValue::Null],
        );
        let result = CategoricalResult::new(vec![category], vec![]).expect("ok");
        let model = bind(&result);
        assert_eq!(model.data_points[0].category, "2024");
        assert_eq!(model.data_points[1].category, BLANK_CATEGORY);
        assert_eq!(model.format_category(&model.data_points[1]), BLANK_CATEGORY);
    }

    #[test]
    fn numeric_categories_follow_category_axis_settings() {
        let category = CategoryColumn::new(
            ColumnMetadata::new("Units"),
            [PrimitiveValue::from(1500), PrimitiveValue::from(2500)],
        );
        let result = CategoricalResult::new(vec![category], vec![]).expect("ok");
        let objects = ObjectProperties::new()
            .with(names::CATEGORY_AXIS, names::DISPLAY_UNITS, 1000.0)
            .with(names::CATEGORY_AXIS, names::PRECISION, 1.0);
        let model = bind_with(&result, &objects);
        let labels: Vec<String> = model
            .data_points
            .iter()
            .map(|p| model.format_category(p))
            .collect();
        assert_eq!(labels, ["1.5K", "2.5K"]);
        // Selection keys and colors still use the plain label.
        assert_eq!(model.data_points[0].category, "1500");
    }

    #[test]
    fn color_override_round_trips() {
        let result = abc(&[1.into(), 2.into(), 3.into()]);
        let plain = bind(&result);
        let key = plain.data_points[1].key.clone();
        let mut objects = ObjectProperties::new();
        objects.set_for(
            &key,
            names::COLOR_SELECTOR,
            names::FILL,
            imagebar_dataview::PropertyValue::Fill("#abcdef".into()),
        );
        let first = bind_with(&result, &objects);
        let second = bind_with(&result, &objects);
        assert_eq!(first.point(&key).map(|p| p.color.as_str()), Some("#abcdef"));
        assert_eq!(first.data_points, second.data_points);
        assert_eq!(first.data_points[0].color, plain.data_points[0].color);
    }

    #[test]
    fn value_formatter_uses_range_magnitude() {
        let model = bind(&abc(&[1500.into(), 2500.into(), 500.into()]));
        assert_eq!(model.value_label_formatter.format_number(2500.0), "2.50K");
    }
}
