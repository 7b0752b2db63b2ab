//! # Concrete Volume Estimation
//!
//! Two distinct operations:
//!
//! - [`estimate_concrete`] - whole-building breakdown from five planning
//!   parameters (area, floors, foundation depth, wall and slab thickness)
//! - [`estimate_block_volume`] - a single rectangular pour from three
//!   dimensions, with a ready-mix truck count
//!
//! ## Assumptions (breakdown form)
//!
//! - Square footprint, side = √area
//! - Foundation is one mat of the footprint at the given depth
//! - 4 columns per floor, 0.3 m × 0.3 m × 3 m
//! - Perimeter beams 0.3 m wide × 0.4 m deep on every floor
//! - One stair per floor, 2 m × 3 m × 0.2 m
//! - Perimeter walls 3 m high per floor, no openings deducted
//!
//! ## Example
//!
//! ```rust
//! use takeoff_core::calculations::concrete::{estimate_concrete, ConcreteInput};
//!
//! let input = ConcreteInput {
//!     area: 100.0,
//!     floors: 1.0,
//!     foundation_depth: 1.0,
//!     wall_thickness: 0.2,
//!     slab_thickness: 0.15,
//! };
//!
//! let result = estimate_concrete(&input).unwrap();
//! assert_eq!(result.total_volume, 146.08);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CalcResult;
use crate::units::round2;
use crate::validation::{self, CalculationKind};

/// Columns per floor
pub const COLUMNS_PER_FLOOR: f64 = 4.0;
/// Column cross-section side (m)
pub const COLUMN_SIDE_M: f64 = 0.3;
/// Storey height used for columns and walls (m)
pub const STOREY_HEIGHT_M: f64 = 3.0;
/// Perimeter beam width (m)
pub const BEAM_WIDTH_M: f64 = 0.3;
/// Perimeter beam depth (m)
pub const BEAM_DEPTH_M: f64 = 0.4;
/// Stair flight width, length and waist thickness (m)
pub const STAIR_WIDTH_M: f64 = 2.0;
pub const STAIR_LENGTH_M: f64 = 3.0;
pub const STAIR_THICKNESS_M: f64 = 0.2;
/// Ready-mix truck capacity (m³)
pub const TRUCK_CAPACITY_M3: f64 = 0.5;

/// Planning parameters for the whole-building breakdown.
///
/// ## JSON Example
///
/// ```json
/// {
///   "projectArea": 100.0,
///   "floors": 2,
///   "foundationDepth": 1.0,
///   "wallThickness": 0.2,
///   "slabThickness": 0.15
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteInput {
    /// Plan area of one floor (m²)
    #[serde(rename = "projectArea")]
    pub area: f64,

    /// Number of floors (at least 1)
    pub floors: f64,

    /// Foundation mat depth (m)
    pub foundation_depth: f64,

    /// Perimeter wall thickness (m)
    pub wall_thickness: f64,

    /// Floor slab thickness (m)
    pub slab_thickness: f64,
}

impl ConcreteInput {
    /// Build from a raw request body, running the geometry validator.
    pub fn from_json(raw: &Value) -> CalcResult<Self> {
        let m = validation::validate(CalculationKind::Concrete, raw)?;
        Ok(ConcreteInput {
            area: m.required("projectArea")?,
            floors: m.required("floors")?,
            foundation_depth: m.required("foundationDepth")?,
            wall_thickness: m.required("wallThickness")?,
            slab_thickness: m.required("slabThickness")?,
        })
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        validation::require_positive("projectArea", self.area)?;
        validation::require_count("floors", self.floors)?;
        validation::require_positive("foundationDepth", self.foundation_depth)?;
        validation::require_positive("wallThickness", self.wall_thickness)?;
        validation::require_positive("slabThickness", self.slab_thickness)?;
        Ok(())
    }

    /// Side of the square footprint (m)
    pub fn side_m(&self) -> f64 {
        self.area.sqrt()
    }

    /// Footprint perimeter (m)
    pub fn perimeter_m(&self) -> f64 {
        4.0 * self.side_m()
    }
}

/// Concrete volume per structural element, all in m³.
///
/// `total_volume` is the rounded sum of the unrounded parts, so it can differ
/// from the sum of the reported parts by a few hundredths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteVolumeBreakdown {
    pub total_volume: f64,
    pub foundation_volume: f64,
    pub columns_volume: f64,
    pub slabs_volume: f64,
    pub beams_volume: f64,
    pub stairs_volume: f64,
    pub walls_volume: f64,
}

impl ConcreteVolumeBreakdown {
    /// Sum of the six element volumes as reported (after rounding)
    pub fn sum_of_parts(&self) -> f64 {
        self.foundation_volume
            + self.columns_volume
            + self.slabs_volume
            + self.beams_volume
            + self.stairs_volume
            + self.walls_volume
    }
}

/// Calculate the concrete breakdown for a building.
///
/// # Returns
///
/// * `Ok(ConcreteVolumeBreakdown)` - all seven volumes
/// * `Err(CalcError)` - if any input is missing, zero or negative
pub fn estimate_concrete(input: &ConcreteInput) -> CalcResult<ConcreteVolumeBreakdown> {
    input.validate()?;

    let side = input.side_m();
    let perimeter = input.perimeter_m();
    let floors = input.floors;

    let foundation = side * side * input.foundation_depth;
    let columns = floors * COLUMNS_PER_FLOOR * COLUMN_SIDE_M * COLUMN_SIDE_M * STOREY_HEIGHT_M;
    let slabs = input.area * input.slab_thickness * floors;
    let beams = floors * perimeter * BEAM_WIDTH_M * BEAM_DEPTH_M;
    let stairs = floors * STAIR_WIDTH_M * STAIR_LENGTH_M * STAIR_THICKNESS_M;
    let walls = floors * perimeter * input.wall_thickness * STOREY_HEIGHT_M;

    Ok(ConcreteVolumeBreakdown {
        total_volume: round2(foundation + columns + slabs + beams + stairs + walls),
        foundation_volume: round2(foundation),
        columns_volume: round2(columns),
        slabs_volume: round2(slabs),
        beams_volume: round2(beams),
        stairs_volume: round2(stairs),
        walls_volume: round2(walls),
    })
}

/// Dimensions of a single rectangular pour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockInput {
    /// Length (m)
    pub length: f64,
    /// Width (m)
    pub width: f64,
    /// Height or thickness (m)
    pub height: f64,
}

impl BlockInput {
    pub fn from_json(raw: &Value) -> CalcResult<Self> {
        let m = validation::validate(CalculationKind::Block, raw)?;
        Ok(BlockInput {
            length: m.required("length")?,
            width: m.required("width")?,
            height: m.required("height")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        validation::require_positive("length", self.length)?;
        validation::require_positive("width", self.width)?;
        validation::require_positive("height", self.height)?;
        Ok(())
    }
}

/// Volume of one pour and the trucks needed to deliver it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockVolume {
    /// Volume (m³), rounded to 2 decimals
    pub volume: f64,
    /// Number of 0.5 m³ trucks, rounded up
    pub trucks: u64,
}

/// Calculate the volume of a single block and its truck count.
///
/// Trucks are counted from the unrounded volume.
pub fn estimate_block_volume(input: &BlockInput) -> CalcResult<BlockVolume> {
    input.validate()?;

    let raw = input.length * input.width * input.height;
    let trucks = (raw / TRUCK_CAPACITY_M3).ceil() as u64;

    Ok(BlockVolume {
        volume: round2(raw),
        trucks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference_building() -> ConcreteInput {
        ConcreteInput {
            area: 100.0,
            floors: 1.0,
            foundation_depth: 1.0,
            wall_thickness: 0.2,
            slab_thickness: 0.15,
        }
    }

    #[test]
    fn test_reference_breakdown() {
        let result = estimate_concrete(&reference_building()).unwrap();
        assert_eq!(result.foundation_volume, 100.0);
        assert_eq!(result.columns_volume, 1.08);
        assert_eq!(result.slabs_volume, 15.0);
        assert_eq!(result.beams_volume, 4.8);
        assert_eq!(result.stairs_volume, 1.2);
        assert_eq!(result.walls_volume, 24.0);
        assert_eq!(result.total_volume, 146.08);
    }

    #[test]
    fn test_total_rounds_unrounded_parts() {
        // Parts: 0.004, 1.08, 0.004, 0.48, 1.2, 0.0048
        let input = ConcreteInput {
            area: 1.0,
            floors: 1.0,
            foundation_depth: 0.004,
            wall_thickness: 0.0004,
            slab_thickness: 0.004,
        };
        let result = estimate_concrete(&input).unwrap();
        assert_eq!(result.foundation_volume, 0.0);
        assert_eq!(result.slabs_volume, 0.0);
        assert_eq!(result.walls_volume, 0.0);
        assert!((result.sum_of_parts() - 2.76).abs() < 1e-9);
        assert_eq!(result.total_volume, 2.77);
    }

    #[test]
    fn test_perimeter() {
        let input = reference_building();
        assert!((input.side_m() - 10.0).abs() < 1e-9);
        assert!((input.perimeter_m() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_matches_parts_within_rounding() {
        let cases = [
            (100.0, 1.0, 1.0, 0.2, 0.15),
            (137.3, 3.0, 1.25, 0.25, 0.12),
            (42.0, 7.0, 0.8, 0.15, 0.2),
            (999.9, 12.0, 2.1, 0.3, 0.18),
            (2.0, 1.0, 0.33, 0.11, 0.07),
        ];
        for (area, floors, fd, wt, st) in cases {
            let input = ConcreteInput {
                area,
                floors,
                foundation_depth: fd,
                wall_thickness: wt,
                slab_thickness: st,
            };
            let result = estimate_concrete(&input).unwrap();
            assert!(
                // Six parts, each off by at most half a hundredth
                (result.total_volume - result.sum_of_parts()).abs() <= 0.03 + 1e-9,
                "area={} floors={}",
                area,
                floors
            );
        }
    }

    #[test]
    fn test_multi_storey_scales_per_floor_elements() {
        let mut input = reference_building();
        input.floors = 3.0;
        let result = estimate_concrete(&input).unwrap();
        // Foundation does not scale with floors
        assert_eq!(result.foundation_volume, 100.0);
        assert_eq!(result.columns_volume, 3.24);
        assert_eq!(result.slabs_volume, 45.0);
        assert_eq!(result.stairs_volume, 3.6);
        assert_eq!(result.walls_volume, 72.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = reference_building();
        input.slab_thickness = 0.0;
        assert!(estimate_concrete(&input).is_err());

        let mut input = reference_building();
        input.area = -100.0;
        assert!(estimate_concrete(&input).is_err());

        let mut input = reference_building();
        input.floors = 0.0;
        assert!(estimate_concrete(&input).is_err());

        let mut input = reference_building();
        input.wall_thickness = f64::NAN;
        assert!(estimate_concrete(&input).is_err());
    }

    #[test]
    fn test_from_json() {
        let raw = json!({
            "projectArea": "100",
            "floors": 1,
            "foundationDepth": 1,
            "wallThickness": 0.2,
            "slabThickness": 0.15
        });
        let input = ConcreteInput::from_json(&raw).unwrap();
        assert_eq!(input, reference_building());

        let raw = json!({ "projectArea": 100, "floors": 1 });
        assert!(ConcreteInput::from_json(&raw).is_err());
    }

    #[test]
    fn test_result_serialization() {
        let result = estimate_concrete(&reference_building()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"totalVolume\":146.08"));
        assert!(json.contains("foundationVolume"));
        assert!(json.contains("wallsVolume"));
    }

    #[test]
    fn test_block_volume() {
        let block = BlockInput {
            length: 2.0,
            width: 1.5,
            height: 0.2,
        };
        let result = estimate_block_volume(&block).unwrap();
        assert_eq!(result.volume, 0.6);
        assert_eq!(result.trucks, 2);
    }

    #[test]
    fn test_block_exact_truck_multiple() {
        let block = BlockInput {
            length: 1.0,
            width: 1.0,
            height: 1.0,
        };
        let result = estimate_block_volume(&block).unwrap();
        assert_eq!(result.volume, 1.0);
        assert_eq!(result.trucks, 2);
    }

    #[test]
    fn test_block_trucks_from_unrounded_volume() {
        let block = BlockInput {
            length: 1.0,
            width: 1.0,
            height: 0.502,
        };
        let result = estimate_block_volume(&block).unwrap();
        assert_eq!(result.volume, 0.5);
        assert_eq!(result.trucks, 2);
    }

    #[test]
    fn test_block_large_pour() {
        let block = BlockInput {
            length: 1.0e6,
            width: 1.0e3,
            height: 10.0,
        };
        let result = estimate_block_volume(&block).unwrap();
        assert_eq!(result.trucks, 20_000_000_000);
    }

    #[test]
    fn test_block_invalid() {
        let block = BlockInput {
            length: 2.0,
            width: 0.0,
            height: 0.2,
        };
        assert!(estimate_block_volume(&block).is_err());
    }
}
