//! # Concrete Takeoff
//!
//! Concrete volume and bag count for rows of post holes. Each hole is a
//! full cylinder; bells and flared bottoms are not modeled.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::calculations::concrete::{calculate, ConcreteInput, HoleSpec};
//!
//! let input = ConcreteInput {
//!     hole_specs: vec![HoleSpec::new("Line Post", 12.0, 36.0, 10)],
//!     include_waste: true,
//!     waste_percent: 10.0,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.total_holes, 10);
//! assert!(result.total_volume_cf > result.subtotal_volume_cf);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::footing::pier_volume;
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::units::{CuFt, CuYd, Inches};

/// Nominal yield of a 60 lb bag of pre-mix (cf)
pub const BAG_60LB_YIELD_CF: f64 = 0.45;

/// Holes deeper than this are flagged (in)
const DEEP_HOLE_IN: f64 = 72.0;

/// Holes wider than this are flagged (in)
const WIDE_HOLE_IN: f64 = 24.0;

fn default_waste_percent() -> f64 {
    10.0
}

/// One row of identical holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    /// Free-text row name (e.g., "Line Post")
    #[serde(default)]
    pub post_type: String,
    pub hole_diameter_in: f64,
    pub hole_depth_in: f64,
    pub hole_count: u32,
}

impl HoleSpec {
    pub fn new(post_type: &str, hole_diameter_in: f64, hole_depth_in: f64, hole_count: u32) -> Self {
        HoleSpec {
            post_type: post_type.to_string(),
            hole_diameter_in,
            hole_depth_in,
            hole_count,
        }
    }

    fn name(&self) -> &str {
        match self.post_type.trim() {
            "" => "Post",
            name => name,
        }
    }
}

/// Input parameters for a concrete takeoff.
///
/// ## JSON Example
///
/// ```json
/// {
///   "hole_specs": [
///     { "post_type": "Line Post", "hole_diameter_in": 10, "hole_depth_in": 30, "hole_count": 20 },
///     { "post_type": "Terminal", "hole_diameter_in": 12, "hole_depth_in": 36, "hole_count": 6 }
///   ],
///   "include_waste": true,
///   "waste_percent": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteInput {
    pub hole_specs: Vec<HoleSpec>,

    /// Add `waste_percent` on top of the net volume
    #[serde(default)]
    pub include_waste: bool,

    /// Waste allowance (%)
    #[serde(default = "default_waste_percent")]
    pub waste_percent: f64,
}

impl ConcreteInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        if self.hole_specs.is_empty() {
            return Err(CalcError::invalid_input("hole_specs", "[]", "At least one hole row is required"));
        }
        for spec in &self.hole_specs {
            require_positive("hole_diameter_in", spec.hole_diameter_in)?;
            require_positive("hole_depth_in", spec.hole_depth_in)?;
        }
        if !(0.0..=100.0).contains(&self.waste_percent) {
            return Err(CalcError::invalid_input(
                "waste_percent",
                self.waste_percent.to_string(),
                "Waste must be between 0 and 100 percent",
            ));
        }
        Ok(())
    }
}

/// Takeoff for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleRowResult {
    pub post_type: String,
    pub hole_diameter_in: f64,
    pub hole_depth_in: f64,
    pub hole_count: u32,
    pub volume_per_hole_cf: f64,
    pub total_volume_cf: f64,
    pub total_volume_cy: f64,
    pub bags_60lb: u32,
}

/// Results from a concrete takeoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteResult {
    pub rows: Vec<HoleRowResult>,
    pub total_holes: u32,
    /// Net volume before waste (cf)
    pub subtotal_volume_cf: f64,
    /// Waste applied (%), 0 when waste is excluded
    pub waste_percent: f64,
    pub waste_volume_cf: f64,
    pub total_volume_cf: f64,
    pub total_volume_cy: f64,
    pub bags_60lb: u32,
    pub assumptions: Vec<String>,
    pub warnings: Vec<String>,
}

/// Number of 60 lb bags for a volume, rounded up.
///
/// Fails when the count does not fit a `u32`.
pub fn bags_for(volume: CuFt) -> CalcResult<u32> {
    let bags = (volume.value() / BAG_60LB_YIELD_CF).ceil();
    if bags.is_finite() && bags <= f64::from(u32::MAX) {
        Ok(bags as u32)
    } else {
        Err(CalcError::invalid_input(
            "hole_specs",
            format!("{:.0} cf", volume.value()),
            "Bag count is too large",
        ))
    }
}

/// Calculate a concrete takeoff.
pub fn calculate(input: &ConcreteInput) -> CalcResult<ConcreteResult> {
    input.validate()?;

    let mut rows = Vec::with_capacity(input.hole_specs.len());
    let mut warnings = Vec::new();
    let mut subtotal = CuFt(0.0);
    let mut total_holes = 0u32;

    for spec in &input.hole_specs {
        let per_hole = pier_volume(Inches(spec.hole_diameter_in), Inches(spec.hole_depth_in));
        let row_total = per_hole * f64::from(spec.hole_count);

        rows.push(HoleRowResult {
            post_type: spec.name().to_string(),
            hole_diameter_in: spec.hole_diameter_in,
            hole_depth_in: spec.hole_depth_in,
            hole_count: spec.hole_count,
            volume_per_hole_cf: per_hole.value(),
            total_volume_cf: row_total.value(),
            total_volume_cy: CuYd::from(row_total).value(),
            bags_60lb: bags_for(row_total)?,
        });

        if spec.hole_depth_in > DEEP_HOLE_IN {
            warnings.push(format!("{} depth {:.0} in is unusually deep.", spec.name(), spec.hole_depth_in));
        }
        if spec.hole_diameter_in > WIDE_HOLE_IN {
            warnings.push(format!("{} diameter {:.0} in is unusually large.", spec.name(), spec.hole_diameter_in));
        }

        subtotal = subtotal + row_total;
        total_holes = total_holes.checked_add(spec.hole_count).ok_or_else(|| {
            CalcError::invalid_input("hole_count", spec.hole_count.to_string(), "Total hole count overflows")
        })?;
    }

    let waste_percent = if input.include_waste { input.waste_percent } else { 0.0 };
    let waste = subtotal * (waste_percent / 100.0);
    let total = subtotal + waste;

    Ok(ConcreteResult {
        rows,
        total_holes,
        subtotal_volume_cf: subtotal.value(),
        waste_percent,
        waste_volume_cf: waste.value(),
        total_volume_cf: total.value(),
        total_volume_cy: CuYd::from(total).value(),
        bags_60lb: bags_for(total)?,
        assumptions: vec![
            "Hole volume modeled as a full cylinder.".to_string(),
            "No bell/bulb footing shape included.".to_string(),
            format!("60 lb bag yield assumed as {:.2} cf per bag.", BAG_60LB_YIELD_CF),
        ],
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_without_waste() {
        let input = ConcreteInput {
            hole_specs: vec![HoleSpec::new("Line Post", 12.0, 36.0, 10)],
            include_waste: false,
            waste_percent: 10.0,
        };
        let out = calculate(&input).unwrap();
        assert_eq!(out.total_holes, 10);
        assert_eq!(out.waste_percent, 0.0);
        // 10 × π × 0.25 × 3 = 23.56 cf -> 53 bags
        assert!((out.total_volume_cf - 23.562).abs() < 0.001);
        assert_eq!(out.bags_60lb, 53);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_multiple_rows_with_waste() {
        let input = ConcreteInput {
            hole_specs: vec![HoleSpec::new("Line Post", 10.0, 30.0, 20), HoleSpec::new("Terminal", 12.0, 36.0, 6)],
            include_waste: true,
            waste_percent: 10.0,
        };
        let out = calculate(&input).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.total_holes, 26);
        assert!((out.waste_volume_cf - out.subtotal_volume_cf * 0.1).abs() < 1e-9);
        assert!(out.total_volume_cf > out.subtotal_volume_cf);
        assert!((out.total_volume_cy - out.total_volume_cf / 27.0).abs() < 1e-12);
    }

    #[test]
    fn test_oversize_warnings_and_default_name() {
        let input = ConcreteInput {
            hole_specs: vec![HoleSpec::new("  ", 30.0, 80.0, 2)],
            include_waste: false,
            waste_percent: 0.0,
        };
        let out = calculate(&input).unwrap();
        assert_eq!(out.rows[0].post_type, "Post");
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_defaults_from_json() {
        let input: ConcreteInput =
            serde_json::from_str(r#"{"hole_specs":[{"hole_diameter_in":10,"hole_depth_in":24,"hole_count":4}]}"#)
                .unwrap();
        assert!(!input.include_waste);
        assert_eq!(input.waste_percent, 10.0);
        assert_eq!(input.hole_specs[0].post_type, "");
    }

    #[test]
    fn test_invalid_input() {
        let empty = ConcreteInput {
            hole_specs: vec![],
            include_waste: false,
            waste_percent: 0.0,
        };
        assert!(calculate(&empty).is_err());
        let bad = ConcreteInput {
            hole_specs: vec![HoleSpec::new("x", 10.0, 0.0, 1)],
            include_waste: false,
            waste_percent: 0.0,
        };
        assert!(calculate(&bad).is_err());
    }

    #[test]
    fn test_hole_total_overflow_is_rejected() {
        let input = ConcreteInput {
            hole_specs: vec![HoleSpec::new("A", 1.0, 1.0, u32::MAX), HoleSpec::new("B", 1.0, 1.0, 1)],
            include_waste: false,
            waste_percent: 0.0,
        };
        let err = calculate(&input).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("hole_count"));
    }

    #[test]
    fn test_bag_count_overflow_is_rejected() {
        // 36 in × 1000 in holes hold about 589 cf each
        let input = ConcreteInput {
            hole_specs: vec![HoleSpec::new("Pier", 36.0, 1000.0, u32::MAX)],
            include_waste: false,
            waste_percent: 0.0,
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "INVALID_INPUT");

        assert_eq!(bags_for(CuFt(0.9)).unwrap(), 2);
        assert!(bags_for(CuFt(f64::INFINITY)).is_err());
    }
}
