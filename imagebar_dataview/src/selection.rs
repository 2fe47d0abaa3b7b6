// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable row identities.

extern crate alloc;

use alloc::sync::Arc;
use core::fmt;

use crate::column::CategoryColumn;
use crate::value::PrimitiveValue;

/// Hashable form of a category cell.
///
/// Numbers are compared by bit pattern after normalizing `-0.0` to `0.0` and
/// every `NaN` to a single canonical `NaN`, so equal cells always produce equal keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyValue {
    /// A missing cell.
    Null,
    /// A boolean cell.
    Bool(bool),
    /// A numeric cell, as normalized `f64` bits.
    Number(u64),
    /// A text cell.
    Text(Arc<str>),
}

impl From<&PrimitiveValue> for KeyValue {
    fn from(value: &PrimitiveValue) -> Self {
        match value {
            PrimitiveValue::Null => Self::Null,
            PrimitiveValue::Bool(b) => Self::Bool(*b),
            PrimitiveValue::Number(v) => {
                let v = if v.is_nan() {
                    f64::NAN
                } else if *v == 0.0 {
                    0.0
                } else {
                    *v
                };
                Self::Number(v.to_bits())
            }
            PrimitiveValue::Text(s) => Self::Text(s.clone()),
        }
    }
}

/// Identity of one category row, used for selection and persisted overrides.
///
/// Keys are derived from the category column's query name and the row's cell,
/// not from the row index, so the same logical row yields a structurally equal
/// key across update cycles even when rows are reordered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    column: Arc<str>,
    value: KeyValue,
}

impl SelectionKey {
    /// Builds the key for `row` of `category`.
    ///
    /// Rows past the end of the column get the key of a missing cell.
    pub fn for_category(category: &CategoryColumn, row: usize) -> Self {
        let value = category
            .values
            .get(row)
            .map_or(KeyValue::Null, KeyValue::from);
        Self {
            column: category.source.query_name.clone(),
            value,
        }
    }

    /// Builds a key directly from a column query name and cell.
    pub fn new(column: &str, value: &PrimitiveValue) -> Self {
        Self {
            column: Arc::from(column),
            value: KeyValue::from(value),
        }
    }

    /// The query name of the column this key was built from.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The normalized cell this key was built from.
    pub fn value(&self) -> &KeyValue {
        &self.value
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            KeyValue::Null => write!(f, "{}=null", self.column),
            KeyValue::Bool(b) => write!(f, "{}={b}", self.column),
            KeyValue::Number(bits) => write!(f, "{}={}", self.column, f64::from_bits(*bits)),
            KeyValue::Text(s) => write!(f, "{}={s:?}", self.column),
        }
    }
}
