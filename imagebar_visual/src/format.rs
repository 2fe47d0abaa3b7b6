// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label formatting.
//!
//! Hosts usually supply their own locale-aware formatter factory; the default
//! here covers display units, fixed precision, percent and thousands grouping.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt;

use imagebar_dataview::PrimitiveValue;
use num_format::{Buffer, Locale};

/// Inputs for building a [`LabelFormatter`].
#[derive(Clone, Debug, PartialEq)]
pub struct FormatOptions {
    /// The column's format string, if the host declared one.
    pub format: Option<String>,
    /// Display units divisor; `0` picks a unit from `reference`.
    pub display_units: f64,
    /// Decimal places.
    pub precision: usize,
    /// Magnitude used to pick an automatic display unit.
    pub reference: f64,
}

impl FormatOptions {
    /// Options with no format string, automatic units and the given precision.
    pub fn new(precision: usize) -> Self {
        Self {
            format: None,
            display_units: 0.0,
            precision,
            reference: 0.0,
        }
    }

    /// Sets the column format string.
    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    /// Sets the display units divisor.
    pub fn with_display_units(mut self, display_units: f64) -> Self {
        self.display_units = display_units;
        self
    }

    /// Sets the magnitude used for automatic units.
    pub fn with_reference(mut self, reference: f64) -> Self {
        self.reference = reference;
        self
    }
}

/// An opaque, pure value-to-string function.
#[derive(Clone)]
pub struct LabelFormatter {
    inner: Arc<dyn Fn(&PrimitiveValue) -> String>,
}

impl LabelFormatter {
    /// Wraps a formatting function.
    pub fn new(f: impl Fn(&PrimitiveValue) -> String + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Formats a cell.
    pub fn format(&self, value: &PrimitiveValue) -> String {
        (self.inner)(value)
    }

    /// Formats a number.
    pub fn format_number(&self, value: f64) -> String {
        self.format(&PrimitiveValue::Number(value))
    }
}

impl fmt::Debug for LabelFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFormatter").finish_non_exhaustive()
    }
}

/// Builds formatters bound to column metadata and axis settings.
pub trait LabelFormatterFactory: fmt::Debug {
    /// Creates a formatter for `options`.
    fn create(&self, options: &FormatOptions) -> LabelFormatter;
}

/// The built-in formatter factory.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFormatterFactory;

impl LabelFormatterFactory for DefaultFormatterFactory {
    fn create(&self, options: &FormatOptions) -> LabelFormatter {
        let pattern = NumberPattern::parse(options);
        LabelFormatter::new(move |value| match value {
            PrimitiveValue::Null => String::new(),
            PrimitiveValue::Bool(b) => b.to_string(),
            PrimitiveValue::Text(s) => s.to_string(),
            PrimitiveValue::Number(v) => pattern.format(*v),
        })
    }
}

/// A display unit chosen for a formatter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayUnit {
    /// No scaling.
    None,
    /// Thousands (`K`).
    Thousands,
    /// Millions (`M`).
    Millions,
    /// Billions (`bn`).
    Billions,
    /// Trillions (`T`).
    Trillions,
    /// An unrecognized divisor, applied without a suffix.
    Custom(f64),
}

impl DisplayUnit {
    /// Resolves the persisted `displayUnits` setting.
    ///
    /// `0` (and any non-positive or non-finite value) picks a unit from the magnitude of `reference`.
    pub fn resolve(display_units: f64, reference: f64) -> Self {
        if !(display_units.is_finite() && display_units > 0.0) {
            return Self::auto(reference);
        }
        [
            Self::None,
            Self::Thousands,
            Self::Millions,
            Self::Billions,
            Self::Trillions,
        ]
        .into_iter()
        .find(|unit| unit.divisor() == display_units)
        .unwrap_or(Self::Custom(display_units))
    }

    fn auto(reference: f64) -> Self {
        let magnitude = reference.abs();
        if !magnitude.is_finite() {
            Self::None
        } else if magnitude >= 1e12 {
            Self::Trillions
        } else if magnitude >= 1e9 {
            Self::Billions
        } else if magnitude >= 1e6 {
            Self::Millions
        } else if magnitude >= 1e3 {
            Self::Thousands
        } else {
            Self::None
        }
    }

    /// The divisor applied to values.
    pub fn divisor(self) -> f64 {
        match self {
            Self::None => 1.0,
            Self::Thousands => 1e3,
            Self::Millions => 1e6,
            Self::Billions => 1e9,
            Self::Trillions => 1e12,
            Self::Custom(d) => d,
        }
    }

    /// The suffix appended to scaled values.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::None | Self::Custom(_) => "",
            Self::Thousands => "K",
            Self::Millions => "M",
            Self::Billions => "bn",
            Self::Trillions => "T",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct NumberPattern {
    unit: DisplayUnit,
    percent: bool,
    grouping: bool,
    precision: usize,
}

impl NumberPattern {
    fn parse(options: &FormatOptions) -> Self {
        let format = options.format.as_deref().unwrap_or("");
        let percent = format.contains('%');
        Self {
            // Percent formats ignore display units.
            unit: if percent {
                DisplayUnit::None
            } else {
                DisplayUnit::resolve(options.display_units, options.reference)
            },
            percent,
            grouping: format.contains(','),
            precision: options.precision,
        }
    }

    fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let (scaled, suffix) = if self.percent {
            (value * 100.0, "%")
        } else {
            (value / self.unit.divisor(), self.unit.suffix())
        };
        let mut digits = format!("{:.*}", self.precision, scaled);
        if is_negative_zero(&digits) {
            digits.remove(0);
        }
        if self.grouping {
            digits = group_thousands(&digits);
        }
        digits.push_str(suffix);
        digits
    }
}

fn is_negative_zero(digits: &str) -> bool {
    digits
        .strip_prefix('-')
        .is_some_and(|rest| rest.chars().all(|c| c == '0' || c == '.'))
}

fn group_thousands(digits: &str) -> String {
    let (sign, unsigned) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (int, frac) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };
    // Integer parts beyond u128 are printed ungrouped.
    let Ok(int) = int.parse::<u128>() else {
        return String::from(digits);
    };
    let mut buf = Buffer::default();
    buf.write_formatted(&int, &Locale::en);
    format!("{sign}{}{frac}", buf.as_str())
}
