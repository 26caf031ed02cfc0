//! # Material Quantities
//!
//! Post counts, top rail, fabric and footing concrete for one fence run,
//! plus a roll-up across runs.
//!
//! ```text
//! bays       = max(round(L / s), 1)
//! line posts = bays - 1
//! specials   = terminals + corners + gate posts
//! ```
//!
//! Specials get the terminal footing; line posts get the line footing.

use serde::{Deserialize, Serialize};

use crate::calculations::footing::pier_volume;
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::units::{CuFt, CuYd, Inches};

/// Terminal posts at the two ends of a run
pub const TERMINALS_PER_RUN: u32 = 2;

/// Pier footing size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootingSize {
    pub diameter_in: f64,
    pub embedment_in: f64,
}

impl FootingSize {
    /// Concrete in one pier
    pub fn volume(&self) -> CuFt {
        pier_volume(Inches(self.diameter_in), Inches(self.embedment_in))
    }
}

/// Input parameters for a run takeoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityInput {
    pub fence_length_ft: f64,
    pub height_ft: f64,
    pub post_spacing_ft: f64,
    pub num_corners: u32,
    /// Gate openings; each one adds two gate posts
    pub num_gates: u32,
    pub line_footing: FootingSize,
    pub terminal_footing: FootingSize,
}

impl QuantityInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("fence_length_ft", self.fence_length_ft)?;
        require_positive("height_total_ft", self.height_ft)?;
        require_positive("post_spacing_ft", self.post_spacing_ft)?;
        for (field, value) in [
            ("footing_diameter_in", self.line_footing.diameter_in),
            ("embedment_depth_in", self.line_footing.embedment_in),
            ("footing_diameter_in", self.terminal_footing.diameter_in),
            ("embedment_depth_in", self.terminal_footing.embedment_in),
        ] {
            require_positive(field, value)?;
        }
        Ok(())
    }
}

/// Quantities for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentQuantities {
    pub fence_length_ft: f64,
    pub height_ft: f64,
    pub post_spacing_ft: f64,

    pub num_line_posts: u32,
    pub num_terminal_posts: u32,
    pub num_corner_posts: u32,
    pub num_gate_posts: u32,
    pub total_posts: u32,

    /// Top rail (linear ft)
    pub top_rail_lf: f64,
    /// Fabric (ft²)
    pub fabric_sf: f64,

    pub concrete_per_line_cf: f64,
    pub concrete_per_terminal_cf: f64,
    pub total_concrete_cf: f64,
    pub total_concrete_cy: f64,

    /// Height plus embedment
    pub line_post_length_ft: f64,
    pub terminal_post_length_ft: f64,
}

/// Compute quantities for one run.
pub fn calculate(input: &QuantityInput) -> CalcResult<SegmentQuantities> {
    input.validate()?;

    let ratio = (input.fence_length_ft / input.post_spacing_ft).round();
    if ratio > f64::from(u32::MAX) {
        return Err(CalcError::invalid_input(
            "fence_length_ft",
            input.fence_length_ft.to_string(),
            format!("Too many bays at {} ft spacing", input.post_spacing_ft),
        ));
    }
    let bays = (ratio as u32).max(1);
    let num_line_posts = bays - 1;

    let too_many = |field: &str, value: u32| CalcError::invalid_input(field, value.to_string(), "Post count overflows");
    let num_gate_posts = input.num_gates.checked_mul(2).ok_or_else(|| too_many("num_gates", input.num_gates))?;
    let specials = TERMINALS_PER_RUN
        .checked_add(input.num_corners)
        .and_then(|n| n.checked_add(num_gate_posts))
        .ok_or_else(|| too_many("num_corners", input.num_corners))?;
    let total_posts = num_line_posts
        .checked_add(specials)
        .ok_or_else(|| too_many("num_corners", input.num_corners))?;

    let per_line = input.line_footing.volume();
    let per_terminal = input.terminal_footing.volume();
    let total = per_line * f64::from(num_line_posts) + per_terminal * f64::from(specials);

    Ok(SegmentQuantities {
        fence_length_ft: input.fence_length_ft,
        height_ft: input.height_ft,
        post_spacing_ft: input.post_spacing_ft,
        num_line_posts,
        num_terminal_posts: TERMINALS_PER_RUN,
        num_corner_posts: input.num_corners,
        num_gate_posts,
        total_posts,
        top_rail_lf: input.fence_length_ft,
        fabric_sf: input.fence_length_ft * input.height_ft,
        concrete_per_line_cf: per_line.value(),
        concrete_per_terminal_cf: per_terminal.value(),
        total_concrete_cf: total.value(),
        total_concrete_cy: CuYd::from(total).value(),
        line_post_length_ft: input.height_ft + input.line_footing.embedment_in / 12.0,
        terminal_post_length_ft: input.height_ft + input.terminal_footing.embedment_in / 12.0,
    })
}

/// Totals across several runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectQuantities {
    pub total_line_posts: u32,
    pub total_terminal_posts: u32,
    pub total_corner_posts: u32,
    pub total_gate_posts: u32,
    pub total_posts: u32,
    pub total_top_rail_lf: f64,
    pub total_fabric_sf: f64,
    pub total_concrete_cf: f64,
    pub total_concrete_cy: f64,
}

impl ProjectQuantities {
    /// Sum run quantities. Fails when a post total leaves the u32 range.
    pub fn from_segments<'a, I>(segments: I) -> CalcResult<Self>
    where
        I: IntoIterator<Item = &'a SegmentQuantities>,
    {
        let mut totals = segments.into_iter().try_fold(ProjectQuantities::default(), |mut acc, s| {
            acc.total_line_posts = add_posts("total_line_posts", acc.total_line_posts, s.num_line_posts)?;
            acc.total_terminal_posts =
                add_posts("total_terminal_posts", acc.total_terminal_posts, s.num_terminal_posts)?;
            acc.total_corner_posts = add_posts("total_corner_posts", acc.total_corner_posts, s.num_corner_posts)?;
            acc.total_gate_posts = add_posts("total_gate_posts", acc.total_gate_posts, s.num_gate_posts)?;
            acc.total_posts = add_posts("total_posts", acc.total_posts, s.total_posts)?;
            acc.total_top_rail_lf += s.top_rail_lf;
            acc.total_fabric_sf += s.fabric_sf;
            acc.total_concrete_cf += s.total_concrete_cf;
            Ok::<_, CalcError>(acc)
        })?;
        totals.total_concrete_cy = CuYd::from(CuFt(totals.total_concrete_cf)).value();
        Ok(totals)
    }
}

fn add_posts(field: &str, total: u32, more: u32) -> CalcResult<u32> {
    total
        .checked_add(more)
        .ok_or_else(|| CalcError::invalid_input(field, format!("{} + {}", total, more), "Project post count overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: FootingSize = FootingSize {
        diameter_in: 10.0,
        embedment_in: 24.0,
    };
    const TERMINAL: FootingSize = FootingSize {
        diameter_in: 16.0,
        embedment_in: 36.0,
    };

    fn run(length: f64, spacing: f64) -> QuantityInput {
        QuantityInput {
            fence_length_ft: length,
            height_ft: 6.0,
            post_spacing_ft: spacing,
            num_corners: 0,
            num_gates: 0,
            line_footing: LINE,
            terminal_footing: TERMINAL,
        }
    }

    #[test]
    fn test_post_counts() {
        let q = calculate(&run(100.0, 10.0)).unwrap();
        assert_eq!(q.num_line_posts, 9);
        assert_eq!(q.num_terminal_posts, 2);
        assert_eq!(q.total_posts, 11);
        assert_eq!(q.top_rail_lf, 100.0);
        assert_eq!(q.fabric_sf, 600.0);
    }

    #[test]
    fn test_corners_and_gates() {
        let mut input = run(200.0, 10.0);
        input.num_corners = 2;
        input.num_gates = 1;
        let q = calculate(&input).unwrap();
        assert_eq!(q.num_gate_posts, 2);
        assert_eq!(q.total_posts, 19 + 2 + 2 + 2);
    }

    #[test]
    fn test_short_run_has_one_bay() {
        let q = calculate(&run(3.0, 10.0)).unwrap();
        assert_eq!(q.num_line_posts, 0);
        assert_eq!(q.total_posts, 2);
    }

    #[test]
    fn test_concrete_and_lengths() {
        let q = calculate(&run(20.0, 10.0)).unwrap();
        let line = LINE.volume().value();
        let term = TERMINAL.volume().value();
        assert!((q.total_concrete_cf - (line + 2.0 * term)).abs() < 1e-9);
        assert_eq!(q.line_post_length_ft, 8.0);
        assert_eq!(q.terminal_post_length_ft, 9.0);
    }

    #[test]
    fn test_project_totals() {
        let a = calculate(&run(100.0, 10.0)).unwrap();
        let b = calculate(&run(50.0, 10.0)).unwrap();
        let totals = ProjectQuantities::from_segments([&a, &b]).unwrap();
        assert_eq!(totals.total_posts, 11 + 6);
        assert_eq!(totals.total_top_rail_lf, 150.0);
        assert!((totals.total_concrete_cy * 27.0 - totals.total_concrete_cf).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_input() {
        assert!(calculate(&run(0.0, 10.0)).is_err());
        assert!(calculate(&run(100.0, -1.0)).is_err());
    }

    #[test]
    fn test_bay_count_beyond_u32_is_rejected() {
        let err = calculate(&run(1e10, 1.0)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("fence_length_ft"));

        // Largest count that still fits
        let q = calculate(&run(f64::from(u32::MAX) - 10.0, 1.0)).unwrap();
        assert_eq!(q.num_line_posts, u32::MAX - 11);
    }

    #[test]
    fn test_gate_and_corner_overflow_is_rejected() {
        let mut gates = run(100.0, 10.0);
        gates.num_gates = 3_000_000_000;
        assert!(calculate(&gates).unwrap_err().to_string().contains("num_gates"));

        let mut corners = run(100.0, 10.0);
        corners.num_corners = u32::MAX - 1;
        assert!(calculate(&corners).unwrap_err().to_string().contains("num_corners"));
    }

    #[test]
    fn test_project_total_overflow_is_rejected() {
        let mut big = run(100.0, 10.0);
        big.num_corners = u32::MAX / 2;
        let a = calculate(&big).unwrap();
        let b = calculate(&big).unwrap();
        let err = ProjectQuantities::from_segments([&a, &b]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
