// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for chart layout.
//!
//! The layout engine sizes axis margins and decides label rotation from measured
//! label extents. Shaping and glyph rendering belong to the host's rendering
//! surface, so chart code only depends on this small measurement interface.
//!
//! The crate has no dependencies and is `no_std`. A canvas `measureText` bridge,
//! a shaping engine, or the bundled [`HeuristicTextMeasurer`] can all implement
//! the same trait.

#![no_std]

/// A minimal text measurement interface used by the layout engine.
///
/// Implementations must be deterministic: measuring the same text with the same
/// style twice yields the same metrics.
pub trait TextMeasurer {
    /// Measure a single line of text.
    ///
    /// `text` is treated as a single line; callers should split on `\n` if they
    /// want multi-line layout.
    fn measure(&self, text: &str, style: TextStyle) -> TextMetrics;

    /// Rendered width of `text` at `font_size`.
    fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        self.measure(text, TextStyle::new(font_size)).advance_width
    }

    /// Rendered line height of `text` at `font_size`.
    fn measure_height(&self, text: &str, font_size: f64) -> f64 {
        self.measure(text, TextStyle::new(font_size)).line_height()
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, style: TextStyle) -> TextMetrics {
        (**self).measure(text, style)
    }

    fn measure_width(&self, text: &str, font_size: f64) -> f64 {
        (**self).measure_width(text, font_size)
    }

    fn measure_height(&self, text: &str, font_size: f64) -> f64 {
        (**self).measure_height(text, font_size)
    }
}

/// Text styling inputs relevant to measurement.
///
/// Axis labels share one family and weight and differ only by size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in the chart’s coordinate system (typically pixels).
    pub font_size: f64,
}

impl TextStyle {
    /// Creates a `TextStyle` with the given `font_size`.
    #[must_use]
    pub fn new(font_size: f64) -> Self {
        Self { font_size }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12.0)
    }
}

/// Measured metrics for a single line of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// The advance width (useful for horizontal layout).
    pub advance_width: f64,
    /// Distance from baseline to the top of typical glyphs.
    pub ascent: f64,
    /// Distance from baseline to the bottom of typical glyphs.
    pub descent: f64,
    /// Additional line spacing beyond ascent+descent.
    pub leading: f64,
}

impl TextMetrics {
    /// Returns `ascent + descent + leading`.
    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.ascent + self.descent + self.leading
    }
}

/// A tiny heuristic text measurer suitable for tests and early layout.
///
/// It assumes an average glyph width of ~0.6em and a baseline at ~0.8em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, style: TextStyle) -> TextMetrics {
        let advance_width = 0.6 * style.font_size * text.chars().count() as f64;
        TextMetrics {
            advance_width,
            ascent: 0.8 * style.font_size,
            descent: 0.2 * style.font_size,
            leading: 0.0,
        }
    }
}
