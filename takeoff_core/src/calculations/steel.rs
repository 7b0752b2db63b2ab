//! # Reinforcement Steel Estimation
//!
//! Two distinct operations:
//!
//! - [`estimate_steel`] - breakdown form. Steel weight from a concrete volume
//!   and an optional steel ratio, distributed across rebar roles and
//!   structural elements.
//! - [`estimate_rebar_weight`] - simple form. Steel weight straight from the
//!   dimensions of one element, a steel density and a reinforcement
//!   percentage.
//!
//! ## Steel Ratio
//!
//! The ratio is overloaded by magnitude:
//!
//! | `steel_ratio`   | kg of steel per m³ of concrete |
//! |-----------------|--------------------------------|
//! | absent          | 80                             |
//! | `< 1`           | `ratio × 7850` (volume fraction)|
//! | `>= 1`          | `ratio` (already kg/m³)        |
//!
//! ## Distribution
//!
//! The six shares are independent fractions of the total. Rebar role
//! (main 40%, secondary 60%) and structural element (columns 30%, beams 25%,
//! slabs 25%, foundation 20%) are two overlapping views of the same steel, so
//! the shares add up to 140%.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculations::steel::{estimate_steel, SteelInput};
//!
//! let result = estimate_steel(&SteelInput::new(10.0)).unwrap();
//! assert_eq!(result.total_weight, 800.0);
//! assert_eq!(result.main_steel_weight, 320.0);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CalcResult;
use crate::units::{round2, CubicMeters, KgPerCubicMeter, Kilograms, Tonnes, STEEL_DENSITY};
use crate::validation::{self, CalculationKind};

/// Steel per m³ of concrete when no ratio is given
pub const DEFAULT_KG_PER_M3: f64 = 80.0;
/// Reinforcement percentage of the simple form when none is given
pub const DEFAULT_REBAR_PERCENTAGE: f64 = 2.0;

pub const MAIN_SHARE: f64 = 0.4;
pub const SECONDARY_SHARE: f64 = 0.6;
pub const COLUMNS_SHARE: f64 = 0.3;
pub const BEAMS_SHARE: f64 = 0.25;
pub const SLABS_SHARE: f64 = 0.25;
pub const FOUNDATION_SHARE: f64 = 0.2;

/// Input for the breakdown form.
///
/// ## JSON Example
///
/// ```json
/// { "concreteVolume": 146.08, "steelRatio": 0.01 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SteelInput {
    /// Concrete volume (m³)
    pub concrete_volume: f64,

    /// Steel ratio, see the module docs for how it is interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steel_ratio: Option<f64>,
}

impl SteelInput {
    /// Input with the default 80 kg/m³ ratio
    pub fn new(concrete_volume: f64) -> Self {
        SteelInput {
            concrete_volume,
            steel_ratio: None,
        }
    }

    pub fn with_ratio(mut self, steel_ratio: f64) -> Self {
        self.steel_ratio = Some(steel_ratio);
        self
    }

    pub fn from_json(raw: &Value) -> CalcResult<Self> {
        let m = validation::validate(CalculationKind::Steel, raw)?;
        Ok(SteelInput {
            concrete_volume: m.required("concreteVolume")?,
            steel_ratio: m.optional("steelRatio"),
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        validation::require_positive("concreteVolume", self.concrete_volume)?;
        if let Some(ratio) = self.steel_ratio {
            validation::require_positive("steelRatio", ratio)?;
        }
        Ok(())
    }

    /// Resolve the steel ratio to kg of steel per m³ of concrete.
    pub fn kg_per_m3(&self) -> KgPerCubicMeter {
        match self.steel_ratio {
            None => KgPerCubicMeter(DEFAULT_KG_PER_M3),
            Some(ratio) if ratio < 1.0 => KgPerCubicMeter(ratio * STEEL_DENSITY.0),
            Some(ratio) => KgPerCubicMeter(ratio),
        }
    }
}

/// Steel weight by rebar role and by structural element, all in kg.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SteelWeightBreakdown {
    pub total_weight: f64,
    pub main_steel_weight: f64,
    pub secondary_steel_weight: f64,
    pub columns_steel: f64,
    pub beams_steel: f64,
    pub slabs_steel: f64,
    pub foundation_steel: f64,
}

/// Calculate the steel breakdown for a concrete volume.
pub fn estimate_steel(input: &SteelInput) -> CalcResult<SteelWeightBreakdown> {
    input.validate()?;

    let total = CubicMeters(input.concrete_volume) * input.kg_per_m3();
    let share = |fraction: f64| round2((total * fraction).0);

    Ok(SteelWeightBreakdown {
        total_weight: round2(total.0),
        main_steel_weight: share(MAIN_SHARE),
        secondary_steel_weight: share(SECONDARY_SHARE),
        columns_steel: share(COLUMNS_SHARE),
        beams_steel: share(BEAMS_SHARE),
        slabs_steel: share(SLABS_SHARE),
        foundation_steel: share(FOUNDATION_SHARE),
    })
}

/// Input for the simple form.
///
/// ## JSON Example
///
/// ```json
/// { "length": 10.0, "width": 0.3, "height": 0.5, "percentage": 1.5 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RebarInput {
    /// Element length (m)
    pub length: f64,
    /// Element width (m)
    pub width: f64,
    /// Element height (m)
    pub height: f64,
    /// Steel density override (kg/m³), 7850 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    /// Reinforcement percentage override, 2% when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl RebarInput {
    pub fn from_json(raw: &Value) -> CalcResult<Self> {
        let m = validation::validate(CalculationKind::Rebar, raw)?;
        Ok(RebarInput {
            length: m.required("length")?,
            width: m.required("width")?,
            height: m.required("height")?,
            density: m.optional("density"),
            percentage: m.optional("percentage"),
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        validation::require_positive("length", self.length)?;
        validation::require_positive("width", self.width)?;
        validation::require_positive("height", self.height)?;
        validation::require_positive("density", self.density())?;
        validation::require_positive("percentage", self.percentage())?;
        Ok(())
    }

    pub fn density(&self) -> f64 {
        self.density.unwrap_or(STEEL_DENSITY.0)
    }

    pub fn percentage(&self) -> f64 {
        self.percentage.unwrap_or(DEFAULT_REBAR_PERCENTAGE)
    }

    /// Gross element volume (m³)
    pub fn volume_m3(&self) -> f64 {
        self.length * self.width * self.height
    }
}

/// Result of the simple form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RebarWeight {
    /// Element volume (m³)
    pub volume: f64,
    /// Steel weight (kg)
    pub steel_weight: f64,
    /// Steel weight (t), from the rounded kg figure
    pub steel_weight_tons: f64,
    /// Density actually used (kg/m³)
    pub density: f64,
    /// Percentage actually used
    pub percentage: f64,
}

/// Calculate rebar weight for one element from its dimensions.
///
/// `weight = length × width × height × density × percentage / 100`
pub fn estimate_rebar_weight(input: &RebarInput) -> CalcResult<RebarWeight> {
    input.validate()?;

    let volume = input.volume_m3();
    let weight = CubicMeters(volume) * KgPerCubicMeter(input.density()) * (input.percentage() / 100.0);
    let weight_kg = round2(weight.0);
    let tons: Tonnes = Kilograms(weight_kg).into();

    Ok(RebarWeight {
        volume: round2(volume),
        steel_weight: weight_kg,
        steel_weight_tons: round2(tons.0),
        density: input.density(),
        percentage: input.percentage(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_ratio() {
        let result = estimate_steel(&SteelInput::new(10.0)).unwrap();
        assert_eq!(result.total_weight, 800.0);
    }

    #[test]
    fn test_fractional_ratio_uses_steel_density() {
        let input = SteelInput::new(10.0).with_ratio(0.08);
        assert!((input.kg_per_m3().0 - 628.0).abs() < 1e-9);
        let result = estimate_steel(&input).unwrap();
        assert_eq!(result.total_weight, 6280.0);
    }

    #[test]
    fn test_direct_ratio() {
        let result = estimate_steel(&SteelInput::new(10.0).with_ratio(100.0)).unwrap();
        assert_eq!(result.total_weight, 1000.0);
    }

    #[test]
    fn test_ratio_of_exactly_one_is_direct() {
        let input = SteelInput::new(10.0).with_ratio(1.0);
        assert_eq!(input.kg_per_m3().0, 1.0);
    }

    #[test]
    fn test_distribution_shares() {
        let result = estimate_steel(&SteelInput::new(10.0)).unwrap();
        assert_eq!(result.main_steel_weight, 320.0);
        assert_eq!(result.secondary_steel_weight, 480.0);
        assert_eq!(result.columns_steel, 240.0);
        assert_eq!(result.beams_steel, 200.0);
        assert_eq!(result.slabs_steel, 200.0);
        assert_eq!(result.foundation_steel, 160.0);

        let by_role = result.main_steel_weight + result.secondary_steel_weight;
        let by_element =
            result.columns_steel + result.beams_steel + result.slabs_steel + result.foundation_steel;
        // Role shares sum to 100%, element shares to 100%, all six to 140%
        assert!((by_role - result.total_weight).abs() < 0.01);
        assert!((by_element - result.total_weight).abs() < 0.01);
    }

    #[test]
    fn test_invalid_volume() {
        assert!(estimate_steel(&SteelInput::new(0.0)).is_err());
        assert!(estimate_steel(&SteelInput::new(-5.0)).is_err());
        assert!(SteelInput::from_json(&json!({})).is_err());
        assert!(SteelInput::from_json(&json!({ "concreteVolume": "ten" })).is_err());
    }

    #[test]
    fn test_invalid_ratio() {
        assert!(estimate_steel(&SteelInput::new(10.0).with_ratio(0.0)).is_err());
        assert!(estimate_steel(&SteelInput::new(10.0).with_ratio(-0.1)).is_err());
    }

    #[test]
    fn test_steel_from_json() {
        let input = SteelInput::from_json(&json!({ "concreteVolume": 10, "steelRatio": null })).unwrap();
        assert_eq!(input, SteelInput::new(10.0));
    }

    #[test]
    fn test_breakdown_serialization() {
        let result = estimate_steel(&SteelInput::new(10.0)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalWeight"], json!(800.0));
        assert_eq!(json["foundationSteel"], json!(160.0));
        assert!(json.get("secondarySteelWeight").is_some());
    }

    #[test]
    fn test_rebar_defaults() {
        let input = RebarInput {
            length: 10.0,
            width: 0.3,
            height: 0.5,
            density: None,
            percentage: None,
        };
        let result = estimate_rebar_weight(&input).unwrap();
        assert_eq!(result.volume, 1.5);
        assert_eq!(result.steel_weight, 235.5);
        assert_eq!(result.steel_weight_tons, 0.24);
        assert_eq!(result.density, 7850.0);
        assert_eq!(result.percentage, 2.0);
    }

    #[test]
    fn test_rebar_overrides() {
        let input = RebarInput {
            length: 4.0,
            width: 0.5,
            height: 0.5,
            density: Some(8000.0),
            percentage: Some(1.0),
        };
        // 1 m³ × 8000 × 1% = 80 kg
        let result = estimate_rebar_weight(&input).unwrap();
        assert_eq!(result.steel_weight, 80.0);
        assert_eq!(result.steel_weight_tons, 0.08);
    }

    #[test]
    fn test_rebar_invalid() {
        let mut input = RebarInput {
            length: 4.0,
            width: 0.5,
            height: 0.5,
            density: Some(0.0),
            percentage: None,
        };
        assert!(estimate_rebar_weight(&input).is_err());

        input.density = None;
        input.percentage = Some(-2.0);
        assert!(estimate_rebar_weight(&input).is_err());

        input.percentage = None;
        input.height = 0.0;
        assert!(estimate_rebar_weight(&input).is_err());
    }

    #[test]
    fn test_rebar_from_json() {
        let input = RebarInput::from_json(&json!({
            "length": "10",
            "width": 0.3,
            "height": 0.5,
            "percentage": 1.5
        }))
        .unwrap();
        assert_eq!(input.density, None);
        assert_eq!(input.percentage, Some(1.5));
    }
}
