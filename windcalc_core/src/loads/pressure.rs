//! # Wind Pressure
//!
//! Design wind pressure on a freestanding fence, after ASCE 7-22 Chapters 26
//! and 29 in simplified form.
//!
//! ## Formulas
//!
//! ```text
//! qz = 0.00256 · Kz · Kzt · V²      (psf, V in mph)
//! p  = qz · G · Cf · I
//! ```
//!
//! - `Kz` comes from the Table 26.10-1 band table below. A height uses the
//!   first band whose upper bound is at or above it. Heights under 15 ft use
//!   the 0-15 ft band and heights over 60 ft use the 60 ft band. There is no
//!   interpolation between bands.
//! - `G = 0.85` (rigid structure)
//! - `Cf` is the porous-fence coefficient from [`FenceType::force_coefficient`]
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::loads::{Exposure, PressureCalculator};
//!
//! let p = PressureCalculator.compute(115.0, Exposure::C, 8.0, 1.0).unwrap();
//! assert!((p.velocity_pressure_psf - 28.78).abs() < 0.01);
//! assert!((p.design_pressure_psf - 12.84).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{require_positive, CalcError, CalcResult};
use crate::loads::fence_types::{cf_solid, FenceType};

/// Velocity pressure constant for US customary units
pub const VELOCITY_PRESSURE_COEFF: f64 = 0.00256;

/// Gust-effect factor for rigid structures (ASCE 7-22 26.11.4)
pub const GUST_FACTOR: f64 = 0.85;

/// Terminal posts carry this multiple of the line-post load
pub const TERMINAL_LOAD_MULTIPLIER: f64 = 1.5;

/// Kz bands: (upper height ft, [B, C, D])
const KZ_BANDS: [(f64, [f64; 3]); 7] = [
    (15.0, [0.57, 0.85, 1.03]),
    (20.0, [0.62, 0.90, 1.08]),
    (25.0, [0.66, 0.94, 1.12]),
    (30.0, [0.70, 0.98, 1.16]),
    (40.0, [0.76, 1.04, 1.22]),
    (50.0, [0.81, 1.09, 1.27]),
    (60.0, [0.85, 1.13, 1.31]),
];

/// ASCE 7 exposure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Exposure {
    /// Urban, suburban, wooded terrain
    B,
    /// Open terrain with scattered obstructions
    C,
    /// Flat unobstructed areas and water surfaces
    D,
}

impl Exposure {
    /// All exposures for iteration
    pub const ALL: [Exposure; 3] = [Exposure::B, Exposure::C, Exposure::D];

    fn column(&self) -> usize {
        match self {
            Exposure::B => 0,
            Exposure::C => 1,
            Exposure::D => 2,
        }
    }

    /// Spacing reduction Cf2 relative to Exposure B
    pub fn spacing_factor(&self) -> f64 {
        match self {
            Exposure::B => 1.0,
            Exposure::C => 0.69,
            Exposure::D => 0.57,
        }
    }

    /// Velocity pressure exposure coefficient Kz at a height (ft)
    pub fn kz(&self, height_ft: f64) -> f64 {
        let col = self.column();
        KZ_BANDS
            .iter()
            .find(|(upper, _)| height_ft <= *upper)
            .map(|(_, row)| row[col])
            .unwrap_or(KZ_BANDS[KZ_BANDS.len() - 1].1[col])
    }
}

impl FromStr for Exposure {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "B" => Ok(Exposure::B),
            "C" => Ok(Exposure::C),
            "D" => Ok(Exposure::D),
            _ => Err(CalcError::invalid_input("exposure", s, "Exposure must be B, C or D")),
        }
    }
}

impl TryFrom<String> for Exposure {
    type Error = CalcError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::fmt::Display for Exposure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Exposure::B => "B",
            Exposure::C => "C",
            Exposure::D => "D",
        };
        write!(f, "{}", code)
    }
}

/// Full set of pressure parameters.
///
/// ## JSON Example
///
/// ```json
/// {
///   "wind_speed_mph": 115.0,
///   "exposure": "C",
///   "height_ft": 8.0,
///   "importance_factor": 1.0,
///   "kzt": 1.0,
///   "fence_type": "chain_link_open",
///   "fence_length_ft": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureInput {
    /// Basic wind speed V (mph)
    pub wind_speed_mph: f64,

    /// Exposure category
    pub exposure: Exposure,

    /// Fence height, used as the reference height (ft)
    pub height_ft: f64,

    /// Importance factor I
    pub importance_factor: f64,

    /// Topographic factor Kzt
    pub kzt: f64,

    /// Fence covering
    pub fence_type: FenceType,

    /// Run length B (ft); unknown runs use the long-fence Cf
    pub fence_length_ft: Option<f64>,
}

impl PressureInput {
    /// Input with default Kzt, fence type and unknown run length
    pub fn new(wind_speed_mph: f64, exposure: Exposure, height_ft: f64, importance_factor: f64) -> Self {
        PressureInput {
            wind_speed_mph,
            exposure,
            height_ft,
            importance_factor,
            kzt: 1.0,
            fence_type: FenceType::default(),
            fence_length_ft: None,
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("wind_speed_mph", self.wind_speed_mph)?;
        require_positive("height_total_ft", self.height_ft)?;
        require_positive("importance_factor", self.importance_factor)?;
        require_positive("kzt", self.kzt)?;
        if let Some(length) = self.fence_length_ft {
            require_positive("fence_length_ft", length)?;
        }
        Ok(())
    }

    /// Aspect ratio B/s when the run length is known
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.fence_length_ft.map(|b| b / self.height_ft)
    }
}

/// Pressure breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureResult {
    /// Exposure coefficient Kz
    pub kz: f64,

    /// Topographic factor Kzt
    pub kzt: f64,

    /// Gust-effect factor G
    pub gust_factor: f64,

    /// Solid-wall force coefficient before the solidity reduction
    pub cf_solid: f64,

    /// Solidity ratio ε of the fence type
    pub solidity: f64,

    /// Net force coefficient Cf = Cf_solid × ε
    pub shape_factor: f64,

    /// Importance factor I
    pub importance_factor: f64,

    /// Velocity pressure qz (psf)
    pub velocity_pressure_psf: f64,

    /// Design pressure p (psf)
    pub design_pressure_psf: f64,
}

/// Tributary loads on one bay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult {
    /// Fence face area between two posts (ft²)
    pub area_per_bay_ft2: f64,

    /// Wind force on one bay (lb)
    pub total_load_lb: f64,

    /// Horizontal load per line post (lb)
    pub load_per_post_lb: f64,

    /// Horizontal load per terminal post (lb)
    pub terminal_load_per_post_lb: f64,
}

impl LoadResult {
    /// Distribute a design pressure over one bay. Each post takes half of
    /// the bay force; terminals are scaled by [`TERMINAL_LOAD_MULTIPLIER`].
    pub fn from_pressure(design_pressure_psf: f64, height_ft: f64, spacing_ft: f64) -> Self {
        let area_per_bay_ft2 = height_ft * spacing_ft;
        let total_load_lb = design_pressure_psf * area_per_bay_ft2;
        let load_per_post_lb = total_load_lb / 2.0;
        LoadResult {
            area_per_bay_ft2,
            total_load_lb,
            load_per_post_lb,
            terminal_load_per_post_lb: load_per_post_lb * TERMINAL_LOAD_MULTIPLIER,
        }
    }
}

/// Calculate design pressure.
///
/// # Returns
///
/// * `Ok(PressureResult)` - Pressure breakdown
/// * `Err(CalcError)` - If any factor is non-positive or non-finite
pub fn calculate(input: &PressureInput) -> CalcResult<PressureResult> {
    input.validate()?;

    let kz = input.exposure.kz(input.height_ft);
    let velocity_pressure_psf = VELOCITY_PRESSURE_COEFF * kz * input.kzt * input.wind_speed_mph.powi(2);

    let aspect_ratio = input.aspect_ratio();
    let cf_solid = cf_solid(aspect_ratio);
    let solidity = input.fence_type.solidity();
    let shape_factor = input.fence_type.force_coefficient(aspect_ratio);

    let design_pressure_psf = velocity_pressure_psf * GUST_FACTOR * shape_factor * input.importance_factor;

    Ok(PressureResult {
        kz,
        kzt: input.kzt,
        gust_factor: GUST_FACTOR,
        cf_solid,
        solidity,
        shape_factor,
        importance_factor: input.importance_factor,
        velocity_pressure_psf,
        design_pressure_psf,
    })
}

/// Stateless pressure calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureCalculator;

impl PressureCalculator {
    /// Design pressure for the default fence type on flat terrain
    pub fn compute(
        &self,
        wind_speed_mph: f64,
        exposure: Exposure,
        height_total_ft: f64,
        importance_factor: f64,
    ) -> CalcResult<PressureResult> {
        calculate(&PressureInput::new(wind_speed_mph, exposure, height_total_ft, importance_factor))
    }

    /// Design pressure with every factor specified
    pub fn compute_detailed(&self, input: &PressureInput) -> CalcResult<PressureResult> {
        calculate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_kz_bands() {
        assert_eq!(Exposure::C.kz(8.0), 0.85);
        assert_eq!(Exposure::C.kz(15.0), 0.85);
        assert_eq!(Exposure::C.kz(15.5), 0.90);
        assert_eq!(Exposure::B.kz(30.0), 0.70);
        assert_eq!(Exposure::D.kz(45.0), 1.27);
    }

    #[test]
    fn test_kz_clamps_at_both_ends() {
        assert_eq!(Exposure::B.kz(0.5), Exposure::B.kz(15.0));
        assert_eq!(Exposure::D.kz(500.0), 1.31);
    }

    #[test]
    fn test_exposure_ordering() {
        for h in [4.0, 12.0, 22.0, 55.0] {
            assert!(Exposure::B.kz(h) < Exposure::C.kz(h));
            assert!(Exposure::C.kz(h) < Exposure::D.kz(h));
        }
    }

    #[test]
    fn test_scenario_pressure() {
        let p = PressureCalculator.compute(115.0, Exposure::C, 8.0, 1.0).unwrap();
        assert!(approx(p.velocity_pressure_psf, 28.7776, 1e-3));
        assert!(approx(p.shape_factor, 0.525, 1e-12));
        assert!(approx(p.design_pressure_psf, 12.842, 1e-3));
    }

    #[test]
    fn test_qz_scales_with_speed_squared() {
        let p1 = PressureCalculator.compute(100.0, Exposure::B, 6.0, 1.0).unwrap();
        let p2 = PressureCalculator.compute(200.0, Exposure::B, 6.0, 1.0).unwrap();
        assert!(approx(p2.velocity_pressure_psf / p1.velocity_pressure_psf, 4.0, 1e-9));
    }

    #[test]
    fn test_below_minimum_band_matches_minimum() {
        let low = PressureCalculator.compute(130.0, Exposure::D, 3.0, 1.0).unwrap();
        let band = PressureCalculator.compute(130.0, Exposure::D, 15.0, 1.0).unwrap();
        assert_eq!(low.design_pressure_psf, band.design_pressure_psf);
    }

    #[test]
    fn test_detailed_inputs() {
        let mut input = PressureInput::new(115.0, Exposure::C, 8.0, 1.15);
        input.kzt = 1.2;
        input.fence_type = FenceType::SolidPanel;
        input.fence_length_ft = Some(16.0);
        let p = PressureCalculator.compute_detailed(&input).unwrap();
        // B/s = 2 -> Cf_solid = 1.2
        assert!(approx(p.cf_solid, 1.2, 1e-12));
        let expected = 0.00256 * 0.85 * 1.2 * 115.0 * 115.0 * 0.85 * 1.2 * 1.15;
        assert!(approx(p.design_pressure_psf, expected, 1e-9));
    }

    #[test]
    fn test_shape_factor_is_fence_force_coefficient() {
        for fence_type in FenceType::ALL {
            let mut input = PressureInput::new(115.0, Exposure::C, 6.0, 1.0);
            input.fence_type = fence_type;
            input.fence_length_ft = Some(60.0);
            let p = calculate(&input).unwrap();
            assert!(approx(p.shape_factor, fence_type.force_coefficient(Some(10.0)), 1e-12));
            assert!(approx(p.shape_factor, p.cf_solid * p.solidity, 1e-12));
        }
    }

    #[test]
    fn test_spacing_factor_by_exposure() {
        assert_eq!(Exposure::B.spacing_factor(), 1.0);
        assert_eq!(Exposure::C.spacing_factor(), 0.69);
        assert_eq!(Exposure::D.spacing_factor(), 0.57);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let calc = PressureCalculator;
        assert!(calc.compute(0.0, Exposure::C, 8.0, 1.0).is_err());
        assert!(calc.compute(115.0, Exposure::C, -1.0, 1.0).is_err());
        assert!(calc.compute(115.0, Exposure::C, 8.0, f64::NAN).is_err());
        let err = calc.compute(f64::INFINITY, Exposure::C, 8.0, 1.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_exposure_parsing() {
        assert_eq!("c".parse::<Exposure>().unwrap(), Exposure::C);
        let err = "E".parse::<Exposure>().unwrap_err();
        assert!(err.is_recoverable());
        let e: Exposure = serde_json::from_str("\"D\"").unwrap();
        assert_eq!(e, Exposure::D);
        assert!(serde_json::from_str::<Exposure>("\"X\"").is_err());
        assert_eq!(serde_json::to_string(&Exposure::B).unwrap(), "\"B\"");
    }

    #[test]
    fn test_load_distribution() {
        let loads = LoadResult::from_pressure(12.842, 8.0, 10.0);
        assert!(approx(loads.area_per_bay_ft2, 80.0, 1e-12));
        assert!(approx(loads.load_per_post_lb, 513.68, 0.01));
        assert!(approx(loads.terminal_load_per_post_lb, 770.52, 0.01));
    }
}
