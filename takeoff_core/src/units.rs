//! # Unit Types
//!
//! Lightweight metric wrappers and the shared rounding rule used by every
//! estimator.
//!
//! ## Metric Only
//!
//! Takeoff works in metric units throughout:
//! - Length: meters (m)
//! - Area: square meters (m²)
//! - Volume: cubic meters (m³)
//! - Mass: kilograms (kg), tonnes (t = 1000 kg)
//!
//! There is no unit conversion layer beyond kg -> t.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::units::{round2, Kilograms, Tonnes};
//!
//! let weight = Kilograms(2350.0);
//! let tons: Tonnes = weight.into();
//! assert_eq!(round2(tons.0), 2.35);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Round to two decimal places, half away from zero.
///
/// Equivalent to `round(x * 100) / 100`. All estimator outputs pass through
/// this one function so that rounding never diverges between calculators.
///
/// ```rust
/// use takeoff_core::units::round2;
///
/// assert_eq!(round2(146.0799999), 146.08);
/// assert_eq!(round2(0.125), 0.13);
/// assert_eq!(round2(-0.125), -0.13);
/// ```
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Volume
// ============================================================================

/// Volume in cubic meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMeters(pub f64);

impl Add for CubicMeters {
    type Output = CubicMeters;
    fn add(self, rhs: CubicMeters) -> CubicMeters {
        CubicMeters(self.0 + rhs.0)
    }
}

/// Volume times density gives mass
impl Mul<KgPerCubicMeter> for CubicMeters {
    type Output = Kilograms;
    fn mul(self, rhs: KgPerCubicMeter) -> Kilograms {
        Kilograms(self.0 * rhs.0)
    }
}

// ============================================================================
// Density
// ============================================================================

/// Density in kilograms per cubic meter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgPerCubicMeter(pub f64);

/// Density of reinforcing steel
pub const STEEL_DENSITY: KgPerCubicMeter = KgPerCubicMeter(7850.0);

// ============================================================================
// Mass
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Mass in metric tonnes (1 t = 1000 kg)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tonnes(pub f64);

impl From<Kilograms> for Tonnes {
    fn from(kg: Kilograms) -> Self {
        Tonnes(kg.0 / 1000.0)
    }
}

impl From<Tonnes> for Kilograms {
    fn from(t: Tonnes) -> Self {
        Kilograms(t.0 * 1000.0)
    }
}

impl Mul<f64> for Kilograms {
    type Output = Kilograms;
    fn mul(self, rhs: f64) -> Kilograms {
        Kilograms(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(1.005 * 1000.0), 1005.0);
        assert_eq!(round2(2.675_1), 2.68);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(-0.005), -0.01);
        assert_eq!(round2(10.0), 10.0);
    }

    #[test]
    fn test_round2_absorbs_float_noise() {
        // 0.1 + 0.2 = 0.30000000000000004
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(100.0 + 1.08 + 15.0 + 4.8 + 1.2 + 24.0), 146.08);
    }

    #[test]
    fn test_mass_conversion() {
        let t: Tonnes = Kilograms(1500.0).into();
        assert_eq!(t.0, 1.5);
        let kg: Kilograms = Tonnes(2.0).into();
        assert_eq!(kg.0, 2000.0);
    }

    #[test]
    fn test_volume_times_density() {
        let mass = CubicMeters(2.0) * STEEL_DENSITY;
        assert_eq!(mass, Kilograms(15700.0));
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&CubicMeters(1.25)).unwrap();
        assert_eq!(json, "1.25");
    }
}
