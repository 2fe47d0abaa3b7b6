// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive cell values.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

/// A single cell of a categorical result.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PrimitiveValue {
    /// A missing cell.
    #[default]
    Null,
    /// A boolean cell.
    Bool(bool),
    /// A numeric cell. May be non-finite when the host forwards `NaN`.
    Number(f64),
    /// A text cell.
    Text(Arc<str>),
}

impl PrimitiveValue {
    /// Returns the number if this cell is a finite number.
    pub fn as_finite_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Returns the text if this cell is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for a missing cell.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Writes the plain string form: text verbatim, numbers in shortest
/// round-trip form, missing cells as the empty string.
impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for PrimitiveValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for PrimitiveValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for PrimitiveValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
