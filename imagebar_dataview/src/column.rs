// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column metadata and columns of a categorical result.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::value::PrimitiveValue;

/// Semantic role a column is bound to, independent of column position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataRole {
    /// Discrete axis labels (one row per category).
    Category,
    /// The primary measure plotted as bar length.
    Value,
    /// Per-category image URL used to texture a bar.
    ImageUrl,
}

impl DataRole {
    /// Parses a host role tag.
    ///
    /// Both the descriptive names and the short tags hosts use in capability
    /// files are accepted (`"Series"`, `"Y"`, `"Image"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Category" | "Series" => Some(Self::Category),
            "Value" | "Y" => Some(Self::Value),
            "ImageUrl" | "Image" => Some(Self::ImageUrl),
            _ => None,
        }
    }

    /// Returns the canonical tag for this role.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Value => "Value",
            Self::ImageUrl => "ImageUrl",
        }
    }
}

/// Descriptive metadata for one column of a result.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnMetadata {
    /// Name shown to end users (tooltips, axis titles).
    pub display_name: String,
    /// Stable query name; part of every [`crate::SelectionKey`] built from this column.
    pub query_name: Arc<str>,
    /// Declared format string, if any.
    pub format: Option<String>,
    /// Roles this column is bound to.
    pub roles: SmallVec<[DataRole; 2]>,
    /// Series group this measure belongs to, when the host groups measures.
    pub group_name: Option<PrimitiveValue>,
}

impl ColumnMetadata {
    /// Creates metadata with the display name defaulting to the query name.
    pub fn new(query_name: &str) -> Self {
        Self {
            display_name: String::from(query_name),
            query_name: Arc::from(query_name),
            format: None,
            roles: SmallVec::new(),
            group_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the declared format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Adds a role binding.
    pub fn with_role(mut self, role: DataRole) -> Self {
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        self
    }

    /// Sets the series group name.
    pub fn with_group_name(mut self, group_name: impl Into<PrimitiveValue>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    /// Returns `true` if this column is bound to `role`.
    pub fn has_role(&self, role: DataRole) -> bool {
        self.roles.contains(&role)
    }
}

/// The category column: one cell per category row.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryColumn {
    /// Column metadata.
    pub source: ColumnMetadata,
    /// One value per row, in source order.
    pub values: Vec<PrimitiveValue>,
}

impl CategoryColumn {
    /// Creates a category column.
    pub fn new(source: ColumnMetadata, values: impl IntoIterator<Item = PrimitiveValue>) -> Self {
        Self {
            source,
            values: values.into_iter().collect(),
        }
    }
}

/// A measure column, aligned to the category rows.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasureColumn {
    /// Column metadata.
    pub source: ColumnMetadata,
    /// One value per category row.
    pub values: Vec<PrimitiveValue>,
}

impl MeasureColumn {
    /// Creates a measure column.
    pub fn new(source: ColumnMetadata, values: impl IntoIterator<Item = PrimitiveValue>) -> Self {
        Self {
            source,
            values: values.into_iter().collect(),
        }
    }

    /// Returns the cell at `row`, treating out-of-range rows as missing.
    pub fn value(&self, row: usize) -> &PrimitiveValue {
        static MISSING: PrimitiveValue = PrimitiveValue::Null;
        self.values.get(row).unwrap_or(&MISSING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tags_accept_short_host_names() {
        assert_eq!(DataRole::from_tag("Series"), Some(DataRole::Category));
        assert_eq!(DataRole::from_tag("Y"), Some(DataRole::Value));
        assert_eq!(DataRole::from_tag("Image"), Some(DataRole::ImageUrl));
        assert_eq!(DataRole::from_tag("Tooltips"), None);
        for role in [DataRole::Category, DataRole::Value, DataRole::ImageUrl] {
            assert_eq!(DataRole::from_tag(role.tag()), Some(role));
        }
    }

    #[test]
    fn duplicate_roles_are_recorded_once() {
        let meta = ColumnMetadata::new("Sales")
            .with_role(DataRole::Value)
            .with_role(DataRole::Value);
        assert_eq!(meta.roles.len(), 1);
        assert!(meta.has_role(DataRole::Value));
        assert!(!meta.has_role(DataRole::ImageUrl));
    }

    #[test]
    fn out_of_range_measure_cells_read_as_missing() {
        let col = MeasureColumn::new(ColumnMetadata::new("Sales"), [PrimitiveValue::from(1.0)]);
        assert_eq!(col.value(0), &PrimitiveValue::Number(1.0));
        assert!(col.value(5).is_null());
    }
}
