// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection state, click transitions and opacity derivation.
//!
//! Data-point clicks are confirmed by a [`SelectionService`] before they take
//! effect: the coordinator only ever holds a key set the service returned.
//! Background clicks reset the state immediately.

extern crate alloc;

use alloc::string::String;
use core::cell::RefCell;
use core::future::{self, Future};

use imagebar_dataview::SelectionKey;
use smallvec::SmallVec;

/// The confirmed keys of a selection. Usually a single key.
pub type SelectedKeys = SmallVec<[SelectionKey; 1]>;

/// The current selection of one visual instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing is selected.
    #[default]
    Unselected,
    /// A non-empty set of keys is selected.
    Selected(SelectedKeys),
}

impl SelectionState {
    /// Builds a state from a key list, dropping duplicates.
    ///
    /// An empty list yields [`SelectionState::Unselected`].
    pub fn from_keys(keys: impl IntoIterator<Item = SelectionKey>) -> Self {
        let mut unique = SelectedKeys::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        if unique.is_empty() {
            Self::Unselected
        } else {
            Self::Selected(unique)
        }
    }

    /// Returns `true` when nothing is selected.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Unselected)
    }

    /// The selected keys; empty when unselected.
    pub fn keys(&self) -> &[SelectionKey] {
        match self {
            Self::Unselected => &[],
            Self::Selected(keys) => keys,
        }
    }

    /// Returns `true` if `key` is selected.
    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.keys().contains(key)
    }

    /// The state a click on `key` leads to.
    ///
    /// Clicking the sole selected key clears the selection; any other click
    /// replaces the selection with `{key}`.
    pub fn after_click(&self, key: &SelectionKey) -> Self {
        match self.keys() {
            [only] if only == key => Self::Unselected,
            _ => Self::Selected(SmallVec::from_buf([key.clone()])),
        }
    }

    /// The render hint for the point identified by `key`.
    pub fn opacity_of(&self, key: &SelectionKey) -> PointOpacity {
        if self.is_empty() || self.contains(key) {
            PointOpacity::Solid
        } else {
            PointOpacity::Dim
        }
    }
}

/// Per-point render hint derived from the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointOpacity {
    /// Fully visible.
    Solid,
    /// De-emphasized because another point is selected.
    Dim,
}

/// Fill opacities for each [`PointOpacity`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpacityConfig {
    /// Opacity of solid points.
    pub solid: f64,
    /// Opacity of dimmed points.
    pub dim: f64,
}

impl Default for OpacityConfig {
    fn default() -> Self {
        Self {
            solid: 1.0,
            dim: 0.5,
        }
    }
}

impl OpacityConfig {
    /// The fill opacity of a point, scaled by the general opacity setting (percent).
    ///
    /// The percentage is clamped to `[10, 100]`; a non-finite value counts as `100`.
    pub fn fill_opacity(&self, hint: PointOpacity, opacity_percent: f64) -> f64 {
        let base = match hint {
            PointOpacity::Solid => self.solid,
            PointOpacity::Dim => self.dim,
        };
        base * clamp_opacity(opacity_percent) / 100.0
    }
}

/// Lower bound of the general opacity setting, in percent.
pub const MIN_OPACITY_PERCENT: f64 = 10.0;
/// Upper bound of the general opacity setting, in percent.
pub const MAX_OPACITY_PERCENT: f64 = 100.0;

/// Clamps a persisted opacity percentage into its valid range.
pub fn clamp_opacity(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(MIN_OPACITY_PERCENT, MAX_OPACITY_PERCENT)
    } else {
        MAX_OPACITY_PERCENT
    }
}

/// Errors reported by a [`SelectionService`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The host refused the selection request.
    #[error("selection rejected by host: {0}")]
    Rejected(String),
    /// The confirmation was abandoned before it resolved.
    #[error("selection confirmation was cancelled")]
    Cancelled,
}

/// The host service that confirms selections (and cross-filters other visuals).
pub trait SelectionService {
    /// Requests a click on `key` and resolves to the confirmed selected keys.
    fn select(
        &self,
        key: &SelectionKey,
    ) -> impl Future<Output = Result<SelectedKeys, SelectionError>>;

    /// Clears the host selection.
    fn clear(&self);
}

impl<T: SelectionService + ?Sized> SelectionService for &T {
    fn select(
        &self,
        key: &SelectionKey,
    ) -> impl Future<Output = Result<SelectedKeys, SelectionError>> {
        (**self).select(key)
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// A service that confirms immediately with single-select toggle semantics.
///
/// Useful for hosts without cross-filtering, and for tests.
#[derive(Debug, Default)]
pub struct LocalSelectionService {
    state: RefCell<SelectionState>,
}

impl LocalSelectionService {
    /// Creates a service with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys the service currently considers selected.
    pub fn selected(&self) -> SelectionState {
        self.state.borrow().clone()
    }
}

impl SelectionService for LocalSelectionService {
    fn select(
        &self,
        key: &SelectionKey,
    ) -> impl Future<Output = Result<SelectedKeys, SelectionError>> {
        let next = self.state.borrow().after_click(key);
        let keys: SelectedKeys = next.keys().iter().cloned().collect();
        *self.state.borrow_mut() = next;
        future::ready(Ok(keys))
    }

    fn clear(&self) {
        *self.state.borrow_mut() = SelectionState::Unselected;
    }
}

/// What was clicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// A bar, identified by its row key.
    DataPoint(SelectionKey),
    /// Anywhere outside the bars.
    Background,
}

/// Whether a click should reach the background handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// Let the event continue.
    Continue,
    /// Stop the event here.
    Stop,
}

/// The result of routing one click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Propagation decision for the originating event.
    pub propagation: Propagation,
    /// Whether the selection state changed.
    pub changed: bool,
}

/// Owns the selection state of one visual instance and applies click transitions.
#[derive(Clone, Debug)]
pub struct SelectionCoordinator {
    state: SelectionState,
    allow_interactions: bool,
}

impl Default for SelectionCoordinator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SelectionCoordinator {
    /// Creates a coordinator with nothing selected.
    pub fn new(allow_interactions: bool) -> Self {
        Self {
            state: SelectionState::Unselected,
            allow_interactions,
        }
    }

    /// The current state.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Whether the host allows selection interactions.
    pub fn allow_interactions(&self) -> bool {
        self.allow_interactions
    }

    /// Updates the host's interaction flag.
    pub fn set_allow_interactions(&mut self, allow: bool) {
        self.allow_interactions = allow;
    }

    /// The render hint for the point identified by `key`.
    pub fn opacity_of(&self, key: &SelectionKey) -> PointOpacity {
        self.state.opacity_of(key)
    }

    /// Routes a click to the matching transition.
    pub async fn click<S: SelectionService>(
        &mut self,
        service: &S,
        target: ClickTarget,
    ) -> ClickOutcome {
        match target {
            ClickTarget::DataPoint(key) => self.click_data_point(service, &key).await,
            ClickTarget::Background => self.click_background(service),
        }
    }

    /// Handles a click on a data point.
    ///
    /// The state changes only once the service confirms; if the returned future
    /// is dropped first, nothing changes. The event never propagates.
    pub async fn click_data_point<S: SelectionService>(
        &mut self,
        service: &S,
        key: &SelectionKey,
    ) -> ClickOutcome {
        let mut outcome = ClickOutcome {
            propagation: Propagation::Stop,
            changed: false,
        };
        if !self.allow_interactions {
            return outcome;
        }
        match service.select(key).await {
            Ok(keys) => {
                let next = SelectionState::from_keys(keys);
                outcome.changed = next != self.state;
                tracing::debug!(%key, selected = next.keys().len(), "selection confirmed");
                self.state = next;
            }
            Err(err) => {
                tracing::warn!(%key, %err, "selection not confirmed, keeping previous state");
            }
        }
        outcome
    }

    /// Handles a click outside every data point.
    pub fn click_background<S: SelectionService>(&mut self, service: &S) -> ClickOutcome {
        let changed = !self.state.is_empty();
        self.state = SelectionState::Unselected;
        service.clear();
        ClickOutcome {
            propagation: Propagation::Continue,
            changed,
        }
    }
}
