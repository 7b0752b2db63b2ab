//! # Cost Estimation
//!
//! Converts concrete volume and steel weight into money.
//!
//! `total = concrete + steel`. Labor (25%), equipment (15%) and overhead (10%)
//! are then allocated as fractions of that total and reported alongside it.
//! They are not part of `total_cost`, so the five breakdown entries add up to
//! 150% of it.
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculations::cost::{estimate_cost, CostInput};
//!
//! let input = CostInput {
//!     concrete_volume: 10.0,
//!     steel_weight: 800.0,
//!     concrete_price_per_m3: 500.0,
//!     steel_price_per_kg: 5.0,
//! };
//! let result = estimate_cost(&input).unwrap();
//! assert_eq!(result.total_cost, 9000.0);
//! assert_eq!(result.cost_breakdown.labor, 2250.0);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CalcResult;
use crate::units::round2;
use crate::validation::{self, CalculationKind};

pub const LABOR_SHARE: f64 = 0.25;
pub const EQUIPMENT_SHARE: f64 = 0.15;
pub const OVERHEAD_SHARE: f64 = 0.10;

/// Quantities and unit prices.
///
/// ## JSON Example
///
/// ```json
/// {
///   "concreteVolume": 10.0,
///   "steelWeight": 800.0,
///   "concretePricePerCubicMeter": 500.0,
///   "steelPricePerKg": 5.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostInput {
    /// Concrete volume (m³)
    pub concrete_volume: f64,
    /// Steel weight (kg)
    pub steel_weight: f64,
    /// Concrete unit price (per m³)
    #[serde(rename = "concretePricePerCubicMeter")]
    pub concrete_price_per_m3: f64,
    /// Steel unit price (per kg)
    pub steel_price_per_kg: f64,
}

impl CostInput {
    pub fn from_json(raw: &Value) -> CalcResult<Self> {
        let m = validation::validate(CalculationKind::Cost, raw)?;
        Ok(CostInput {
            concrete_volume: m.required("concreteVolume")?,
            steel_weight: m.required("steelWeight")?,
            concrete_price_per_m3: m.required("concretePricePerCubicMeter")?,
            steel_price_per_kg: m.required("steelPricePerKg")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        validation::require_positive("concreteVolume", self.concrete_volume)?;
        validation::require_positive("steelWeight", self.steel_weight)?;
        validation::require_positive("concretePricePerCubicMeter", self.concrete_price_per_m3)?;
        validation::require_positive("steelPricePerKg", self.steel_price_per_kg)?;
        Ok(())
    }
}

/// Allocation of the estimated total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostAllocation {
    pub concrete: f64,
    pub steel: f64,
    pub labor: f64,
    pub equipment: f64,
    pub overhead: f64,
}

/// Cost estimate with its breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub concrete_cost: f64,
    pub steel_cost: f64,
    pub total_cost: f64,
    pub cost_breakdown: CostAllocation,
}

/// Calculate material cost and the labor/equipment/overhead allocation.
pub fn estimate_cost(input: &CostInput) -> CalcResult<CostBreakdown> {
    input.validate()?;

    let concrete = input.concrete_volume * input.concrete_price_per_m3;
    let steel = input.steel_weight * input.steel_price_per_kg;
    let total = concrete + steel;

    Ok(CostBreakdown {
        concrete_cost: round2(concrete),
        steel_cost: round2(steel),
        total_cost: round2(total),
        cost_breakdown: CostAllocation {
            concrete: round2(concrete),
            steel: round2(steel),
            labor: round2(total * LABOR_SHARE),
            equipment: round2(total * EQUIPMENT_SHARE),
            overhead: round2(total * OVERHEAD_SHARE),
        },
    })
}
