// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precomputed role → measure index lookup.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::column::DataRole;
use crate::result::CategoricalResult;

/// Measure indices per role, built once per binding pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleMap {
    indices: HashMap<DataRole, SmallVec<[usize; 1]>>,
}

impl RoleMap {
    /// Scans the measure columns of `result` once.
    ///
    /// Indices for a role are kept in host column order.
    pub fn new(result: &CategoricalResult) -> Self {
        let mut indices: HashMap<DataRole, SmallVec<[usize; 1]>> = HashMap::new();
        for (i, col) in result.measures().iter().enumerate() {
            for &role in &col.source.roles {
                indices.entry(role).or_default().push(i);
            }
        }
        Self { indices }
    }

    /// The first measure bound to `role`.
    pub fn first(&self, role: DataRole) -> Option<usize> {
        self.all(role).first().copied()
    }

    /// Every measure bound to `role`.
    pub fn all(&self, role: DataRole) -> &[usize] {
        self.indices
            .get(&role)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns `true` if at least one measure is bound to `role`.
    pub fn contains(&self, role: DataRole) -> bool {
        !self.all(role).is_empty()
    }
}
