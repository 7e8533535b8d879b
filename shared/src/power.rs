use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw power units per displayed "M".
pub const UNITS_PER_MILLION: i64 = 1_000_000;

/// Inputs below this are treated as already scaled to millions (e.g. `85.4`).
pub const LEGACY_SCALED_THRESHOLD: f64 = 1000.0;

/// Hero/squad power in canonical raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Power(i64);

impl Power {
    pub const ZERO: Power = Power(0);

    pub fn from_raw(raw: i64) -> Self {
        Self(raw.max(0))
    }

    /// Normalize a user-entered or imported value into raw units.
    ///
    /// Values in `(0, 1000)` are millions and get scaled up; larger values are
    /// already raw. Negative, zero and non-finite inputs become zero.
    pub fn from_input(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::ZERO;
        }
        let raw = if value < LEGACY_SCALED_THRESHOLD {
            value * UNITS_PER_MILLION as f64
        } else {
            value
        };
        Self(raw.round().min(i64::MAX as f64) as i64)
    }

    pub fn raw(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn millions(self) -> f64 {
        self.0 as f64 / UNITS_PER_MILLION as f64
    }

    /// Compact label with one decimal, e.g. `85.0M`.
    pub fn display(self) -> String {
        format!("{:.1}M", self.millions())
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}M", self.millions())
    }
}
