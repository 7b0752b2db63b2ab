//! # Quantity & Cost Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable, camelCase on the wire)
//! - `*Input::from_json` - Build from a raw body through the geometry validator
//! - `estimate_*(input) -> CalcResult<*>` - Pure calculation function
//!
//! No estimator reads global state or performs I/O. Every output is rounded
//! with [`crate::units::round2`].
//!
//! ## Available Calculations
//!
//! - [`concrete`] - Building concrete breakdown, single block volume
//! - [`steel`] - Steel breakdown from concrete volume, rebar from dimensions
//! - [`cost`] - Material cost with labor/equipment/overhead allocation
//! - [`estimate_building`] - concrete -> steel -> cost in one call

pub mod concrete;
pub mod cost;
pub mod steel;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CalcResult;
use crate::validation::{self, CalculationKind};

// Re-export commonly used types
pub use concrete::{
    estimate_block_volume, estimate_concrete, BlockInput, BlockVolume, ConcreteInput,
    ConcreteVolumeBreakdown,
};
pub use cost::{estimate_cost, CostAllocation, CostBreakdown, CostInput};
pub use steel::{
    estimate_rebar_weight, estimate_steel, RebarInput, RebarWeight, SteelInput,
    SteelWeightBreakdown,
};

/// Planning parameters plus the steel ratio and unit prices.
///
/// ## JSON Example
///
/// ```json
/// {
///   "projectArea": 100.0,
///   "floors": 1,
///   "foundationDepth": 1.0,
///   "wallThickness": 0.2,
///   "slabThickness": 0.15,
///   "steelRatio": 100,
///   "concretePricePerCubicMeter": 500.0,
///   "steelPricePerKg": 5.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInput {
    #[serde(flatten)]
    pub concrete: ConcreteInput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steel_ratio: Option<f64>,

    #[serde(rename = "concretePricePerCubicMeter")]
    pub concrete_price_per_m3: f64,

    pub steel_price_per_kg: f64,
}

impl BuildingInput {
    pub fn from_json(raw: &Value) -> CalcResult<Self> {
        let m = validation::validate(CalculationKind::Building, raw)?;
        Ok(BuildingInput {
            concrete: ConcreteInput {
                area: m.required("projectArea")?,
                floors: m.required("floors")?,
                foundation_depth: m.required("foundationDepth")?,
                wall_thickness: m.required("wallThickness")?,
                slab_thickness: m.required("slabThickness")?,
            },
            steel_ratio: m.optional("steelRatio"),
            concrete_price_per_m3: m.required("concretePricePerCubicMeter")?,
            steel_price_per_kg: m.required("steelPricePerKg")?,
        })
    }
}

/// All three stages of a building estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingEstimate {
    pub concrete: ConcreteVolumeBreakdown,
    pub steel: SteelWeightBreakdown,
    pub cost: CostBreakdown,
}

/// Run concrete, steel and cost estimation in sequence.
///
/// The concrete total volume feeds the steel and cost stages; the steel total
/// weight feeds the cost stage. If any stage fails nothing is returned.
///
/// ```rust
/// use takeoff_core::calculations::{estimate_building, BuildingInput, ConcreteInput};
///
/// let input = BuildingInput {
///     concrete: ConcreteInput {
///         area: 100.0,
///         floors: 1.0,
///         foundation_depth: 1.0,
///         wall_thickness: 0.2,
///         slab_thickness: 0.15,
///     },
///     steel_ratio: None,
///     concrete_price_per_m3: 500.0,
///     steel_price_per_kg: 5.0,
/// };
/// let estimate = estimate_building(&input).unwrap();
/// assert_eq!(estimate.steel.total_weight, 11686.4);
/// ```
pub fn estimate_building(input: &BuildingInput) -> CalcResult<BuildingEstimate> {
    let concrete = estimate_concrete(&input.concrete)?;

    let steel = estimate_steel(&SteelInput {
        concrete_volume: concrete.total_volume,
        steel_ratio: input.steel_ratio,
    })?;

    let cost = estimate_cost(&CostInput {
        concrete_volume: concrete.total_volume,
        steel_weight: steel.total_weight,
        concrete_price_per_m3: input.concrete_price_per_m3,
        steel_price_per_kg: input.steel_price_per_kg,
    })?;

    Ok(BuildingEstimate {
        concrete,
        steel,
        cost,
    })
}
