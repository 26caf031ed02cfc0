//! # Footing Check
//!
//! Lateral soil resistance of a round concrete pier, simplified from
//! IBC 1807.3. Advisory only: the result never changes post selection or
//! the overall status.
//!
//! ## Formulas
//!
//! ```text
//! M_ot     = P × H / 2                  (ft-lb, resultant at mid-height)
//! M_resist = S1 × b × d² / 3            (ft-lb, triangular soil pressure)
//! SF       = M_resist / M_ot            (required ≥ 1.5)
//! d_min    = √(3 × SF_req × M_ot / (S1 × b))
//! ```
//!
//! `S1` is the allowable lateral bearing per foot of depth from IBC Table
//! 1806.2, `b` the pier diameter and `d` the embedment, both in feet.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::calculations::footing::{calculate, FootingInput, SoilClass};
//!
//! let input = FootingInput::new(513.7, 8.0, 10.0, 24.0, SoilClass::Sand);
//! let result = calculate(&input).unwrap();
//! assert!(result.safety_factor < 1.5);
//! assert!(result.min_embedment_ft > result.actual_embedment_ft);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::errors::{require_positive, CalcResult};
use crate::units::{CuFt, Feet, Inches};

/// Safety factor against overturning
pub const REQUIRED_SAFETY_FACTOR: f64 = 1.5;

/// IBC Table 1806.2 soil class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClass {
    RockCrystalline,
    RockSedimentary,
    Gravel,
    Sand,
    Clay,
    /// Stiff soil, used when the soil is unknown
    #[default]
    Default,
}

impl SoilClass {
    /// All soil classes for iteration
    pub const ALL: [SoilClass; 6] = [
        SoilClass::RockCrystalline,
        SoilClass::RockSedimentary,
        SoilClass::Gravel,
        SoilClass::Sand,
        SoilClass::Clay,
        SoilClass::Default,
    ];

    /// Resolve an opaque soil label. Unknown or missing labels map to
    /// [`SoilClass::Default`].
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return SoilClass::Default;
        };
        let code = label.trim().to_lowercase().replace([' ', '-'], "_");
        SoilClass::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .unwrap_or(SoilClass::Default)
    }

    /// Key used in JSON and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            SoilClass::RockCrystalline => "rock_crystalline",
            SoilClass::RockSedimentary => "rock_sedimentary",
            SoilClass::Gravel => "gravel",
            SoilClass::Sand => "sand",
            SoilClass::Clay => "clay",
            SoilClass::Default => "default",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SoilClass::RockCrystalline => "Crystalline bedrock (Class 1)",
            SoilClass::RockSedimentary => "Sedimentary rock (Class 2)",
            SoilClass::Gravel => "Sandy gravel, GW/GP (Class 3)",
            SoilClass::Sand => "Sand, silty sand, SW/SP/SM (Class 4)",
            SoilClass::Clay => "Clay, sandy clay, CL/ML (Class 5)",
            SoilClass::Default => "Default - stiff soil (conservative)",
        }
    }

    /// Allowable lateral bearing S1 (psf per ft of depth)
    pub fn lateral_bearing_psf_per_ft(&self) -> f64 {
        match self {
            SoilClass::RockCrystalline => 1200.0,
            SoilClass::RockSedimentary => 400.0,
            SoilClass::Gravel => 200.0,
            SoilClass::Sand => 150.0,
            SoilClass::Clay => 100.0,
            SoilClass::Default => 150.0,
        }
    }
}

/// Input parameters for a pier footing check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingInput {
    /// Horizontal wind load on the post (lb)
    pub load_per_post_lb: f64,

    /// Fence height above grade (ft)
    pub height_above_grade_ft: f64,

    /// Pier diameter (in)
    pub footing_diameter_in: f64,

    /// Embedment below grade (in)
    pub embedment_depth_in: f64,

    /// Soil class
    pub soil: SoilClass,

    /// Required safety factor
    pub required_sf: f64,
}

impl FootingInput {
    /// Input with the standard required safety factor
    pub fn new(load_per_post_lb: f64, height_above_grade_ft: f64, footing_diameter_in: f64, embedment_depth_in: f64, soil: SoilClass) -> Self {
        FootingInput {
            load_per_post_lb,
            height_above_grade_ft,
            footing_diameter_in,
            embedment_depth_in,
            soil,
            required_sf: REQUIRED_SAFETY_FACTOR,
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("load_per_post_lb", self.load_per_post_lb)?;
        require_positive("height_total_ft", self.height_above_grade_ft)?;
        require_positive("footing_diameter_in", self.footing_diameter_in)?;
        require_positive("embedment_depth_in", self.embedment_depth_in)?;
        require_positive("required_sf", self.required_sf)?;
        Ok(())
    }
}

/// Results from a footing check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingResult {
    /// Overturning moment at grade (ft-lb)
    pub overturning_moment_ft_lb: f64,

    /// Resisting moment from soil (ft-lb)
    pub resisting_moment_ft_lb: f64,

    /// M_resist / M_ot
    pub safety_factor: f64,

    /// SF meets the required value
    pub footing_ok: bool,

    /// Embedment needed for the required SF (ft)
    pub min_embedment_ft: f64,

    /// Embedment provided (ft)
    pub actual_embedment_ft: f64,

    /// Pier diameter (in)
    pub footing_diameter_in: f64,

    /// Soil class used
    pub soil: SoilClass,

    /// S1 used (psf per ft)
    pub lateral_bearing_psf_per_ft: f64,

    /// Concrete in one pier (cf)
    pub concrete_volume_cf: f64,
}

/// Concrete volume of a cylindrical pier (cf)
pub fn pier_volume(diameter: Inches, depth: Inches) -> CuFt {
    let radius_ft = Feet::from(diameter).value() / 2.0;
    CuFt(PI * radius_ft.powi(2) * Feet::from(depth).value())
}

/// Check pier footing overturning resistance.
pub fn calculate(input: &FootingInput) -> CalcResult<FootingResult> {
    input.validate()?;

    let s1 = input.soil.lateral_bearing_psf_per_ft();
    let b_ft = Feet::from(Inches(input.footing_diameter_in)).value();
    let d_ft = Feet::from(Inches(input.embedment_depth_in)).value();

    let m_ot = input.load_per_post_lb * input.height_above_grade_ft / 2.0;
    let m_resist = s1 * b_ft * d_ft.powi(2) / 3.0;
    let safety_factor = m_resist / m_ot;
    let min_embedment_ft = (3.0 * input.required_sf * m_ot / (s1 * b_ft)).sqrt();

    Ok(FootingResult {
        overturning_moment_ft_lb: m_ot,
        resisting_moment_ft_lb: m_resist,
        safety_factor,
        footing_ok: safety_factor >= input.required_sf,
        min_embedment_ft,
        actual_embedment_ft: d_ft,
        footing_diameter_in: input.footing_diameter_in,
        soil: input.soil,
        lateral_bearing_psf_per_ft: s1,
        concrete_volume_cf: pier_volume(Inches(input.footing_diameter_in), Inches(input.embedment_depth_in)).value(),
    })
}
