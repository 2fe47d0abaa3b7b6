// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-facing data shapes for the imagebar visual.
//!
//! This crate models what the host analytics application hands to a visual on
//! every update cycle:
//! - a categorical result set (one category column plus role-tagged measure
//!   columns), validated on construction,
//! - stable per-row [`SelectionKey`]s used for cross-filtering and persisted
//!   per-category overrides, and
//! - the persisted object property bag written by the host's format pane.
//!
//! The core only ever reads these values; nothing here is mutated by binding.

#![no_std]

extern crate alloc;

mod column;
mod objects;
mod result;
mod roles;
mod selection;
mod value;

pub use column::{CategoryColumn, ColumnMetadata, DataRole, MeasureColumn};
pub use objects::{ObjectProperties, PropertyMap, PropertyValue};
pub use result::{CategoricalResult, DataViewError};
pub use roles::RoleMap;
pub use selection::{KeyValue, SelectionKey};
pub use value::PrimitiveValue;
