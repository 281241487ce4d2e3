use std::fmt;

use serde::{Deserialize, Serialize};

const BASIS_POINTS_PER_UNIT: i128 = 10_000;
const FULL_RATE_BP: i64 = 10_000;

/// A percentage stored as fixed-point basis points (1 bp = 0.01 %).
///
/// Serializes as a plain percent number (`20.0`) so operation records keep their natural shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Rate {
    basis_points: i64,
}

impl Rate {
    pub const ZERO: Rate = Rate { basis_points: 0 };

    pub const fn from_basis_points(basis_points: i64) -> Self {
        Self { basis_points }
    }

    /// Rounds to the nearest basis point. Use [`Rate::from_percent_exact`] at settings boundaries.
    pub fn from_percent(percent: f64) -> Self {
        Self {
            basis_points: (percent * 100.0).round() as i64,
        }
    }

    /// Returns `None` when `percent` does not land on a whole basis point.
    pub fn from_percent_exact(percent: f64) -> Option<Self> {
        if !percent.is_finite() {
            return None;
        }
        let scaled = percent * 100.0;
        let rounded = scaled.round();
        ((scaled - rounded).abs() < 1e-6).then(|| Self::from_basis_points(rounded as i64))
    }

    /// Parts-per-million; `None` when the value is finer than one basis point.
    pub fn from_ppm_exact(ppm: i64) -> Option<Self> {
        (ppm % 100 == 0).then(|| Self::from_basis_points(ppm / 100))
    }

    pub fn basis_points(&self) -> i64 {
        self.basis_points
    }

    pub fn percent(&self) -> f64 {
        self.basis_points as f64 / 100.0
    }

    /// Whether the rate lies within 0 %..=100 %.
    pub fn is_within_bounds(&self) -> bool {
        (0..=FULL_RATE_BP).contains(&self.basis_points)
    }

    /// `round(amount_cents * rate)`, rounding half away from zero on this single amount.
    pub fn apply(&self, amount_cents: i64) -> i64 {
        let product = amount_cents as i128 * self.basis_points as i128;
        let half = BASIS_POINTS_PER_UNIT / 2;
        let rounded = if product >= 0 {
            (product + half) / BASIS_POINTS_PER_UNIT
        } else {
            (product - half) / BASIS_POINTS_PER_UNIT
        };
        rounded as i64
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Rate {
    fn from(percent: f64) -> Self {
        Rate::from_percent(percent)
    }
}

impl From<Rate> for f64 {
    fn from(rate: Rate) -> Self {
        rate.percent()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.basis_points < 0 { "-" } else { "" };
        let abs = self.basis_points.unsigned_abs();
        let (whole, frac) = (abs / 100, abs % 100);
        match frac {
            0 => write!(f, "{sign}{whole}%"),
            f10 if f10 % 10 == 0 => write!(f, "{sign}{whole}.{}%", f10 / 10),
            _ => write!(f, "{sign}{whole}.{frac:02}%"),
        }
    }
}
