//! Fence types and force coefficients.
//!
//! A fence face is porous: open chain link blocks roughly a third of the
//! wind, slats or screens block most of it. The net force coefficient is the
//! solid-wall coefficient scaled by the solidity ratio:
//!
//! ```text
//! Cf = Cf_solid(B/s) × ε
//! ```
//!
//! `Cf_solid` follows ASCE 7-22 Figure 29.3-1 (Case A, ground-mounted wall),
//! linearly interpolated in B/s and clamped to the tabulated range.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CalcError;

/// Cf_solid when the run length is unknown (long run, B/s ≥ 20)
pub const CF_SOLID_LONG_FENCE: f64 = 1.5;

/// (B/s, Cf_solid) points, ascending in B/s
const CF_SOLID_TABLE: [(f64, f64); 5] = [(2.0, 1.2), (5.0, 1.3), (10.0, 1.4), (20.0, 1.5), (45.0, 1.75)];

/// Fence covering, which fixes the solidity ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FenceType {
    /// Bare chain link fabric
    #[default]
    ChainLinkOpen,
    /// Chain link with 50% windscreen
    #[serde(rename = "chain_link_windscreen_50")]
    ChainLinkWindscreen50,
    /// Chain link with 80% windscreen
    #[serde(rename = "chain_link_windscreen_80")]
    ChainLinkWindscreen80,
    /// Chain link with privacy slats
    ChainLinkSlats,
    /// Solid wood, vinyl or metal panel
    SolidPanel,
}

impl FenceType {
    /// All fence types for iteration
    pub const ALL: [FenceType; 5] = [
        FenceType::ChainLinkOpen,
        FenceType::ChainLinkWindscreen50,
        FenceType::ChainLinkWindscreen80,
        FenceType::ChainLinkSlats,
        FenceType::SolidPanel,
    ];

    /// Solidity ratio ε (0..=1)
    pub fn solidity(&self) -> f64 {
        match self {
            FenceType::ChainLinkOpen => 0.35,
            FenceType::ChainLinkWindscreen50 => 0.50,
            FenceType::ChainLinkWindscreen80 => 0.80,
            FenceType::ChainLinkSlats => 0.85,
            FenceType::SolidPanel => 1.0,
        }
    }

    /// Key used in JSON and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            FenceType::ChainLinkOpen => "chain_link_open",
            FenceType::ChainLinkWindscreen50 => "chain_link_windscreen_50",
            FenceType::ChainLinkWindscreen80 => "chain_link_windscreen_80",
            FenceType::ChainLinkSlats => "chain_link_slats",
            FenceType::SolidPanel => "solid_panel",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FenceType::ChainLinkOpen => "Open Chain Link",
            FenceType::ChainLinkWindscreen50 => "Chain Link w/ 50% Windscreen",
            FenceType::ChainLinkWindscreen80 => "Chain Link w/ 80% Windscreen",
            FenceType::ChainLinkSlats => "Chain Link w/ Privacy Slats",
            FenceType::SolidPanel => "Solid Panel (Wood / Vinyl / Metal)",
        }
    }

    /// Net force coefficient for this fence type
    pub fn force_coefficient(&self, aspect_ratio_bs: Option<f64>) -> f64 {
        cf_solid(aspect_ratio_bs) * self.solidity()
    }
}

impl FromStr for FenceType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        FenceType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| CalcError::invalid_input("fence_type", s, "Unknown fence type"))
    }
}

impl std::fmt::Display for FenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Solid-wall force coefficient for a B/s ratio.
///
/// `None` means the run length is unknown and returns [`CF_SOLID_LONG_FENCE`].
pub fn cf_solid(aspect_ratio_bs: Option<f64>) -> f64 {
    let Some(bs) = aspect_ratio_bs else {
        return CF_SOLID_LONG_FENCE;
    };

    let (first_bs, first_cf) = CF_SOLID_TABLE[0];
    let (last_bs, last_cf) = CF_SOLID_TABLE[CF_SOLID_TABLE.len() - 1];
    if bs <= first_bs {
        return first_cf;
    }
    if bs >= last_bs {
        return last_cf;
    }

    CF_SOLID_TABLE
        .windows(2)
        .find(|w| bs <= w[1].0)
        .map(|w| {
            let (bs_lo, cf_lo) = w[0];
            let (bs_hi, cf_hi) = w[1];
            cf_lo + (bs - bs_lo) / (bs_hi - bs_lo) * (cf_hi - cf_lo)
        })
        .unwrap_or(last_cf)
}
