// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned categorical result set handed to the visual on every update.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::column::{CategoryColumn, DataRole, MeasureColumn};

/// Errors returned when building a [`CategoricalResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataViewError {
    /// A measure column is not aligned to the category rows.
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        /// Query name of the offending column.
        column: String,
        /// Category row count.
        expected: usize,
        /// Values found in the column.
        found: usize,
    },
    /// Two category columns disagree on the row count.
    #[error("category column `{column}` has {found} rows, expected {expected}")]
    CategoryMismatch {
        /// Query name of the offending column.
        column: String,
        /// Row count of the first category column.
        expected: usize,
        /// Rows found in the column.
        found: usize,
    },
}

/// A categorical result: category columns plus role-tagged measure columns.
///
/// This is a deliberately small representation:
/// - the first category column drives rows (one row per category),
/// - measures are aligned to those rows, and
/// - roles are carried on each column's metadata, not implied by position.
///
/// A result with no category columns is valid; binding treats it as missing data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoricalResult {
    categories: Vec<CategoryColumn>,
    measures: Vec<MeasureColumn>,
}

impl CategoricalResult {
    /// Builds a result, checking that every column is aligned to the category rows.
    pub fn new(
        categories: Vec<CategoryColumn>,
        measures: Vec<MeasureColumn>,
    ) -> Result<Self, DataViewError> {
        if let Some(first) = categories.first() {
            let expected = first.values.len();
            for col in &categories[1..] {
                if col.values.len() != expected {
                    return Err(DataViewError::CategoryMismatch {
                        column: col.source.query_name.to_string(),
                        expected,
                        found: col.values.len(),
                    });
                }
            }
            for col in &measures {
                if col.values.len() != expected {
                    return Err(DataViewError::LengthMismatch {
                        column: col.source.query_name.to_string(),
                        expected,
                        found: col.values.len(),
                    });
                }
            }
        }
        Ok(Self {
            categories,
            measures,
        })
    }

    /// A result with no columns at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The category column that drives rows, if any.
    pub fn category(&self) -> Option<&CategoryColumn> {
        self.categories.first()
    }

    /// All category columns.
    pub fn categories(&self) -> &[CategoryColumn] {
        &self.categories
    }

    /// All measure columns, in host order.
    pub fn measures(&self) -> &[MeasureColumn] {
        &self.measures
    }

    /// Returns the measure column at `index`.
    pub fn measure(&self, index: usize) -> Option<&MeasureColumn> {
        self.measures.get(index)
    }

    /// Returns the number of category rows (zero without a category column).
    pub fn row_count(&self) -> usize {
        self.category().map_or(0, |c| c.values.len())
    }

    /// Returns `true` if any column (category or measure) is bound to `role`.
    pub fn has_role(&self, role: DataRole) -> bool {
        self.categories.iter().any(|c| c.source.has_role(role))
            || self.measures.iter().any(|c| c.source.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use super::*;
    use crate::column::ColumnMetadata;
    use crate::value::PrimitiveValue;

    fn category(n: usize) -> CategoryColumn {
        CategoryColumn::new(
            ColumnMetadata::new("Region").with_role(DataRole::Category),
            (0..n).map(|i| PrimitiveValue::from(i as f64)),
        )
    }

    fn measure(name: &str, n: usize) -> MeasureColumn {
        MeasureColumn::new(
            ColumnMetadata::new(name).with_role(DataRole::Value),
            (0..n).map(|i| PrimitiveValue::from(i as f64)),
        )
    }

    #[test]
    fn aligned_columns_build() {
        let result = CategoricalResult::new(vec![category(3)], vec![measure("Sales", 3)])
            .expect("aligned result");
        assert_eq!(result.row_count(), 3);
        assert!(result.has_role(DataRole::Value));
        assert!(!result.has_role(DataRole::ImageUrl));
    }

    #[test]
    fn misaligned_measure_is_rejected() {
        let err = CategoricalResult::new(vec![category(3)], vec![measure("Sales", 2)])
            .expect_err("misaligned measure");
        assert_eq!(
            err,
            DataViewError::LengthMismatch {
                column: "Sales".to_string(),
                expected: 3,
                found: 2,
            }
        );
        assert_eq!(err.to_string(), "column `Sales` has 2 values, expected 3");
    }

    #[test]
    fn misaligned_category_is_rejected() {
        let err = CategoricalResult::new(vec![category(3), category(4)], vec![])
            .expect_err("misaligned category");
        assert!(matches!(err, DataViewError::CategoryMismatch { found: 4, .. }));
    }

    #[test]
    fn measures_without_categories_are_allowed() {
        let result = CategoricalResult::new(vec![], vec![measure("Sales", 2)]).expect("valid");
        assert!(result.category().is_none());
        assert_eq!(result.row_count(), 0);
    }
}
