//! # Fence Estimate
//!
//! One request, one response: design pressure, line and terminal post
//! selection, a traffic-light status, and advisory footing/deflection checks.
//!
//! ## Flow
//!
//! 1. Validate [`EstimateInput`]; nothing is computed for bad input
//! 2. Design pressure and bay loads
//! 3. Line post: select (or check a pinned post) with the line load
//! 4. Terminal post: same, with line load × [`TERMINAL_LOAD_MULTIPLIER`]
//! 5. Classify, then attach footing and deflection checks, warnings,
//!    assumptions and, when the run length is known, quantities
//!
//! The engine borrows the catalog and tables and holds no mutable state, so
//! one engine can serve any number of threads. Identical input gives
//! identical output.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::calculations::{EstimateEngine, EstimateInput, OverallStatus};
//! use windcalc_core::loads::Exposure;
//! use windcalc_core::materials::PostCatalog;
//! use windcalc_core::tables::SpacingTableStore;
//!
//! let catalog = PostCatalog::builtin();
//! let tables = SpacingTableStore::empty();
//! let engine = EstimateEngine::new(&catalog, &tables);
//!
//! let input = EstimateInput::new(115.0, 8.0, 10.0, Exposure::C);
//! let output = engine.calculate(&input).unwrap();
//!
//! assert!(output.shared.pressure_psf > 0.0);
//! assert_eq!(output.overall_status, OverallStatus::Yellow);
//! println!("Line post: {}", output.line.selection.recommended.post_label);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::deflection::{self, DeflectionResult};
use crate::calculations::footing::{self, FootingInput, FootingResult, SoilClass};
use crate::calculations::post_selection::{
    PostRole, PostSelector, SelectionMethod, SelectionRequest, SelectionResult, LEVER_ARM_FRACTION,
};
use crate::calculations::quantities::{self, FootingSize, QuantityInput, SegmentQuantities};
use crate::calculations::risk::{OverallStatus, RiskClassifier, RiskThresholds};
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::loads::{pressure, Exposure, FenceType, LoadResult, PressureInput, PressureResult, TERMINAL_LOAD_MULTIPLIER};
use crate::materials::{PostCatalog, PostGroup, PostSpec, OMEGA_B};
use crate::project::RiskCategory;
use crate::settings::Settings;
use crate::tables::SpacingTableStore;

/// Heights above this are outside common published tables (ft)
const TALL_FENCE_FT: f64 = 12.0;

/// Wind speeds above this are outside standard tables (mph)
const HIGH_WIND_MPH: f64 = 150.0;

/// Pressures above this are suspicious (psf)
const HIGH_PRESSURE_PSF: f64 = 60.0;

/// Post loads above this exceed simplified guidance (lb)
const HIGH_POST_LOAD_LB: f64 = 2000.0;

fn default_exposure() -> Exposure {
    Exposure::C
}

fn default_post_group() -> PostGroup {
    PostGroup::Pipe
}

fn one() -> f64 {
    1.0
}

/// Input parameters for a fence estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "wind_speed_mph": 115.0,
///   "height_total_ft": 8.0,
///   "post_spacing_ft": 10.0,
///   "exposure": "C",
///   "risk_category": "II",
///   "importance_factor": 1.0,
///   "soil_type": "clay",
///   "strict_footing": false
/// }
/// ```
///
/// Every other field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateInput {
    /// Basic wind speed V (mph)
    pub wind_speed_mph: f64,

    /// Fence height above grade (ft)
    pub height_total_ft: f64,

    /// Requested on-center post spacing (ft)
    pub post_spacing_ft: f64,

    /// Exposure category
    #[serde(default = "default_exposure")]
    pub exposure: Exposure,

    /// Risk category (informational; wind speed already reflects it)
    #[serde(default)]
    pub risk_category: RiskCategory,

    /// Importance factor I
    #[serde(default = "one")]
    pub importance_factor: f64,

    /// Soil label; only the footing check reads it
    #[serde(default)]
    pub soil_type: Option<String>,

    /// Treat an inadequate post as an error
    #[serde(default)]
    pub strict_footing: bool,

    /// Fence covering
    #[serde(default)]
    pub fence_type: FenceType,

    /// Topographic factor Kzt
    #[serde(default = "one")]
    pub kzt: f64,

    /// Post family to select from
    #[serde(default = "default_post_group")]
    pub post_group: PostGroup,

    /// Pin the line post instead of selecting one
    #[serde(default)]
    pub line_post_key: Option<String>,

    /// Pin the terminal post instead of selecting one
    #[serde(default)]
    pub terminal_post_key: Option<String>,

    /// Run length (ft); enables B/s and quantities
    #[serde(default)]
    pub fence_length_ft: Option<f64>,

    #[serde(default)]
    pub num_corners: u32,

    /// Gate openings
    #[serde(default)]
    pub num_gates: u32,

    /// Embedment override for all footings (in)
    #[serde(default)]
    pub embedment_depth_in: Option<f64>,

    /// Diameter override for all footings (in)
    #[serde(default)]
    pub footing_diameter_in: Option<f64>,
}

impl EstimateInput {
    /// Input with defaults for every optional field
    pub fn new(wind_speed_mph: f64, height_total_ft: f64, post_spacing_ft: f64, exposure: Exposure) -> Self {
        EstimateInput {
            wind_speed_mph,
            height_total_ft,
            post_spacing_ft,
            exposure,
            risk_category: RiskCategory::default(),
            importance_factor: 1.0,
            soil_type: None,
            strict_footing: false,
            fence_type: FenceType::default(),
            kzt: 1.0,
            post_group: PostGroup::Pipe,
            line_post_key: None,
            terminal_post_key: None,
            fence_length_ft: None,
            num_corners: 0,
            num_gates: 0,
            embedment_depth_in: None,
            footing_diameter_in: None,
        }
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("wind_speed_mph", self.wind_speed_mph)?;
        require_positive("height_total_ft", self.height_total_ft)?;
        require_positive("post_spacing_ft", self.post_spacing_ft)?;
        require_positive("importance_factor", self.importance_factor)?;
        require_positive("kzt", self.kzt)?;

        for (field, value) in [
            ("fence_length_ft", self.fence_length_ft),
            ("embedment_depth_in", self.embedment_depth_in),
            ("footing_diameter_in", self.footing_diameter_in),
        ] {
            if let Some(v) = value {
                require_positive(field, v)?;
            }
        }

        for (field, key) in [("line_post_key", &self.line_post_key), ("terminal_post_key", &self.terminal_post_key)] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(CalcError::invalid_input(field, "", "Post key must not be empty"));
            }
        }
        Ok(())
    }

    fn pressure_input(&self) -> PressureInput {
        PressureInput {
            wind_speed_mph: self.wind_speed_mph,
            exposure: self.exposure,
            height_ft: self.height_total_ft,
            importance_factor: self.importance_factor,
            kzt: self.kzt,
            fence_type: self.fence_type,
            fence_length_ft: self.fence_length_ft,
        }
    }
}

/// Values shared by the line and terminal blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedResult {
    /// Design pressure (psf)
    pub pressure_psf: f64,

    /// Line post load (lb)
    pub load_per_post_lb: f64,

    /// Terminal post load (lb)
    pub terminal_load_per_post_lb: f64,

    /// Pressure breakdown
    pub pressure: PressureResult,

    /// Bay loads
    pub loads: LoadResult,
}

/// Selection plus advisory checks for one post role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostBlock {
    #[serde(flatten)]
    pub selection: SelectionResult,

    /// Load used for this role (lb)
    pub load_lb: f64,

    pub footing: FootingResult,

    pub deflection: DeflectionResult,
}

/// Results from a fence estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateOutput {
    pub shared: SharedResult,
    pub line: PostBlock,
    pub terminal: PostBlock,
    pub overall_status: OverallStatus,
    /// Why the status is not GREEN
    pub status_reasons: Vec<String>,
    pub warnings: Vec<String>,
    pub assumptions: Vec<String>,
    /// Present when the run length is known
    pub quantities: Option<SegmentQuantities>,
}

/// Orchestrates one estimate over borrowed reference data.
#[derive(Debug, Clone)]
pub struct EstimateEngine<'a> {
    catalog: &'a PostCatalog,
    tables: &'a SpacingTableStore,
    settings: Settings,
}

impl<'a> EstimateEngine<'a> {
    /// Engine with default settings
    pub fn new(catalog: &'a PostCatalog, tables: &'a SpacingTableStore) -> Self {
        EstimateEngine {
            catalog,
            tables,
            settings: Settings::default(),
        }
    }

    /// Replace the settings
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.settings = settings.clone();
        self
    }

    /// Settings in use
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Post catalog in use
    pub fn catalog(&self) -> &'a PostCatalog {
        self.catalog
    }

    /// Run one estimate.
    ///
    /// # Returns
    ///
    /// * `Ok(EstimateOutput)` - Possibly RED with `adequate = false` posts
    /// * `Err(CalcError::InvalidInput)` - Bad input, nothing computed
    /// * `Err(CalcError::PostNotFound)` - Unknown pinned post key
    /// * `Err(CalcError::StructuralInadequacy)` - Strict mode and no adequate post
    pub fn calculate(&self, input: &EstimateInput) -> CalcResult<EstimateOutput> {
        input.validate()?;
        self.settings.validate()?;

        let strict = input.strict_footing || self.settings.strict_footing;
        let pressure = pressure::calculate(&input.pressure_input())?;
        let loads = LoadResult::from_pressure(pressure.design_pressure_psf, input.height_total_ft, input.post_spacing_ft);

        debug!(
            wind_speed_mph = input.wind_speed_mph,
            exposure = %input.exposure,
            pressure_psf = pressure.design_pressure_psf,
            load_per_post_lb = loads.load_per_post_lb,
            strict,
            "estimating"
        );

        let selector = PostSelector::new(self.catalog, self.tables);
        let line = self.select_role(&selector, input, PostRole::Line, loads.load_per_post_lb, strict)?;
        let terminal = self.select_role(&selector, input, PostRole::Terminal, loads.terminal_load_per_post_lb, strict)?;

        let classifier = RiskClassifier::new(self.settings.risk.clone());
        let assessment = classifier.assess(&line, &terminal);

        let soil = SoilClass::from_label(input.soil_type.as_deref());
        let line = self.post_block(input, line, loads.load_per_post_lb, soil)?;
        let terminal = self.post_block(input, terminal, loads.terminal_load_per_post_lb, soil)?;

        let quantities = match input.fence_length_ft {
            Some(fence_length_ft) => Some(quantities::calculate(&QuantityInput {
                fence_length_ft,
                height_ft: input.height_total_ft,
                post_spacing_ft: input.post_spacing_ft,
                num_corners: input.num_corners,
                num_gates: input.num_gates,
                line_footing: self.footing_size(input, &line.selection.recommended.post_key)?,
                terminal_footing: self.footing_size(input, &terminal.selection.recommended.post_key)?,
            })?),
            None => None,
        };

        let warnings = self.warnings(input, &pressure, &loads, &line, &terminal);
        let assumptions = assumptions(input, &pressure, classifier.thresholds());

        Ok(EstimateOutput {
            shared: SharedResult {
                pressure_psf: pressure.design_pressure_psf,
                load_per_post_lb: loads.load_per_post_lb,
                terminal_load_per_post_lb: loads.terminal_load_per_post_lb,
                pressure,
                loads,
            },
            line,
            terminal,
            overall_status: assessment.status,
            status_reasons: assessment.reasons,
            warnings,
            assumptions,
            quantities,
        })
    }

    fn select_role(
        &self,
        selector: &PostSelector<'_>,
        input: &EstimateInput,
        role: PostRole,
        load_lb: f64,
        strict: bool,
    ) -> CalcResult<SelectionResult> {
        let pinned = match role {
            PostRole::Line => input.line_post_key.as_deref(),
            PostRole::Terminal => input.terminal_post_key.as_deref(),
        };

        let mut request = SelectionRequest {
            group: input.post_group,
            load_per_post_lb: load_lb,
            requested_spacing_ft: input.post_spacing_ft,
            height_ft: input.height_total_ft,
            wind_speed_mph: input.wind_speed_mph,
            exposure: input.exposure,
            role,
        };

        match pinned {
            Some(key) => {
                let spec = self.catalog.get(key.trim())?;
                request.group = spec.group();
                selector.evaluate(spec, &request, strict)
            }
            None => selector.select(&request, strict),
        }
    }

    fn footing_size(&self, input: &EstimateInput, post_key: &str) -> CalcResult<FootingSize> {
        let spec: &PostSpec = self.catalog.get(post_key)?;
        Ok(FootingSize {
            diameter_in: input.footing_diameter_in.unwrap_or(spec.footing_diameter_in),
            embedment_in: input.embedment_depth_in.unwrap_or(spec.footing_embedment_in),
        })
    }

    fn post_block(&self, input: &EstimateInput, selection: SelectionResult, load_lb: f64, soil: SoilClass) -> CalcResult<PostBlock> {
        let spec = self.catalog.get(&selection.recommended.post_key)?;
        let size = self.footing_size(input, &spec.key)?;

        let footing = footing::calculate(&FootingInput::new(
            load_lb,
            input.height_total_ft,
            size.diameter_in,
            size.embedment_in,
            soil,
        ))?;
        let deflection = deflection::calculate(spec, input.height_total_ft, load_lb)?;

        Ok(PostBlock {
            selection,
            load_lb,
            footing,
            deflection,
        })
    }

    fn warnings(
        &self,
        input: &EstimateInput,
        pressure: &PressureResult,
        loads: &LoadResult,
        line: &PostBlock,
        terminal: &PostBlock,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        if input.height_total_ft > TALL_FENCE_FT {
            warnings.push("Fence height exceeds common tabulated limits; PE review recommended.".to_string());
        }
        if input.wind_speed_mph > HIGH_WIND_MPH {
            warnings.push("Wind speed beyond standard tables; verify with local code official.".to_string());
        }
        if !self.tables.is_empty() && !self.tables.has_wind_speed(input.wind_speed_mph) {
            warnings.push(format!(
                "No spacing table for {} mph; posts checked by simplified bending formula.",
                input.wind_speed_mph
            ));
        }
        if pressure.design_pressure_psf > HIGH_PRESSURE_PSF {
            warnings.push("Calculated pressure is very high; check exposure and risk category.".to_string());
        }
        if loads.load_per_post_lb > HIGH_POST_LOAD_LB {
            warnings.push("Post load exceeds simplified recommendations.".to_string());
        }

        for block in [line, terminal] {
            let s = &block.selection;
            let role = s.role;
            if !s.adequate {
                warnings.push(format!(
                    "No adequate {} post: {} shown for reference only, not a valid design.",
                    role, s.recommended.display_name
                ));
            }
            match (s.method, s.max_spacing_ft) {
                (SelectionMethod::Table, Some(max)) if max < input.post_spacing_ft => warnings.push(format!(
                    "Requested spacing {:.1} ft exceeds table limit {:.1} ft for {} {} post.",
                    input.post_spacing_ft, max, s.recommended.post_label, role
                )),
                (SelectionMethod::Formula, Some(max)) if max < input.post_spacing_ft => warnings.push(format!(
                    "For post {} at {:.0} mph and exposure {}, max recommended spacing is about {:.2} ft; \
                     current spacing {:.2} ft exceeds this simplified limit.",
                    s.recommended.post_label, input.wind_speed_mph, input.exposure, max, input.post_spacing_ft
                )),
                _ => {}
            }
            if !block.footing.footing_ok {
                warnings.push(format!(
                    "{} footing SF = {:.2} (need >= {:.2}). Min embedment: {:.1} ft ({:.0} in).",
                    role,
                    block.footing.safety_factor,
                    footing::REQUIRED_SAFETY_FACTOR,
                    block.footing.min_embedment_ft,
                    block.footing.min_embedment_ft * 12.0
                ));
            }
            if !block.deflection.deflection_ok {
                warnings.push(format!(
                    "{} post deflection {:.2} in exceeds L/60 limit of {:.2} in. Consider a stiffer post.",
                    role, block.deflection.deflection_in, block.deflection.allowable_in
                ));
            }
        }

        warnings
    }
}

fn assumptions(input: &EstimateInput, pressure: &PressureResult, thresholds: &RiskThresholds) -> Vec<String> {
    let bs_note = match input.fence_length_ft {
        Some(length) => format!(
            "B/s = {:.1} (fence length {:.0} ft / height {} ft)",
            length / input.height_total_ft,
            length,
            input.height_total_ft
        ),
        None => "B/s >= 20 assumed (long run; fence length not specified)".to_string(),
    };

    vec![
        format!(
            "Design wind speed V = {} mph (3-sec gust) for Risk Category {}, from ASCE 7 maps or project drawings.",
            input.wind_speed_mph, input.risk_category
        ),
        format!(
            "Velocity pressure qz = 0.00256 x Kz x Kzt x V^2 = {:.2} psf.",
            pressure.velocity_pressure_psf
        ),
        format!(
            "Kz = {:.2} (Exposure {}, h = {} ft, Table 26.10-1 bands, no interpolation).",
            pressure.kz, input.exposure, input.height_total_ft
        ),
        format!("Kzt = {} (topographic factor).", pressure.kzt),
        format!("G = {} (rigid structure gust-effect factor).", pressure.gust_factor),
        format!(
            "Cf = {:.3} ({}, solidity = {:.2}, {}, Figure 29.3-1).",
            pressure.shape_factor,
            input.fence_type.display_name(),
            pressure.solidity,
            bs_note
        ),
        format!("Importance factor I = {}.", pressure.importance_factor),
        "Uniform pressure across the bay; post load = bay load / 2.".to_string(),
        format!("Terminal post load = line post load x {}.", TERMINAL_LOAD_MULTIPLIER),
        "Spacing tables govern where published; otherwise bending check is used.".to_string(),
        "Without a table value, max spacing is advisory: base spacing x Cf1 (wind) x Cf2 (exposure) x Cf3.".to_string(),
        format!(
            "Bending demand M = P x {:.1}H; allowable M = Fy x S / {} (ASD), Fy = 50 ksi.",
            LEVER_ARM_FRACTION, OMEGA_B
        ),
        "Deflection check: delta = P*L^3 / (8*E*I), limit L/60 (advisory).".to_string(),
        "Footing check per IBC 1807.3: triangular soil pressure, SF >= 1.5 (advisory).".to_string(),
        format!(
            "Status: GREEN (table, margin >= {:.2}), YELLOW (margin below {:.2} or formula), RED (margin < 1.00 or no adequate post).",
            thresholds.green_margin, thresholds.green_margin
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_a() -> EstimateInput {
        EstimateInput::new(115.0, 8.0, 10.0, Exposure::C)
    }

    #[test]
    fn test_engine_is_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<EstimateEngine<'static>>();
    }

    #[test]
    fn test_scenario_a() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let out = engine.calculate(&scenario_a()).unwrap();
        assert!((out.shared.pressure_psf - 12.842).abs() < 0.01);
        assert!((out.shared.load_per_post_lb - 513.7).abs() < 0.1);
        assert!((out.shared.terminal_load_per_post_lb - 770.5).abs() < 0.1);

        assert_eq!(out.line.selection.recommended.post_key, "2_7_8_S80");
        assert_eq!(out.terminal.selection.recommended.post_key, "4_0_PIPE");
        assert_eq!(out.line.selection.method, SelectionMethod::Formula);
        assert!(out.line.selection.adequate && out.terminal.selection.adequate);
        assert_eq!(out.overall_status, OverallStatus::Yellow);
        assert!(out.quantities.is_none());
        assert!(!out.assumptions.is_empty());
    }

    #[test]
    fn test_scenario_b_lenient() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut input = scenario_a();
        input.post_spacing_ft = 1000.0;
        let out = engine.calculate(&input).unwrap();

        assert_eq!(out.overall_status, OverallStatus::Red);
        assert!(!out.line.selection.adequate);
        assert_eq!(
            out.line.selection.recommended.post_key,
            catalog.largest(PostGroup::Pipe).unwrap().key
        );
        assert!(out.warnings.iter().any(|w| w.contains("not a valid design")));
    }

    #[test]
    fn test_strict_mode_divergence() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut input = scenario_a();
        input.post_spacing_ft = 1000.0;
        assert!(engine.calculate(&input).is_ok());

        input.strict_footing = true;
        let err = engine.calculate(&input).unwrap_err();
        assert!(err.is_structural());

        // Strict from settings behaves the same
        input.strict_footing = false;
        let settings = Settings {
            strict_footing: true,
            ..Settings::default()
        };
        let strict_engine = EstimateEngine::new(&catalog, &tables).with_settings(&settings);
        assert!(strict_engine.calculate(&input).unwrap_err().is_structural());
    }

    #[test]
    fn test_clamping_below_minimum_band() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut low = scenario_a();
        low.height_total_ft = 4.0;
        let mut band = scenario_a();
        band.height_total_ft = 15.0;
        let a = engine.calculate(&low).unwrap();
        let b = engine.calculate(&band).unwrap();
        assert_eq!(a.shared.pressure_psf, b.shared.pressure_psf);
    }

    #[test]
    fn test_table_priority_and_green() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::builder()
            .spacing(115, PostGroup::Pipe, "1 7/8\"", 8.0, 12.0)
            .build()
            .unwrap();
        let engine = EstimateEngine::new(&catalog, &tables);

        let out = engine.calculate(&scenario_a()).unwrap();
        assert_eq!(out.line.selection.method, SelectionMethod::Table);
        assert_eq!(out.line.selection.recommended.post_key, "1_7_8_PIPE");
        assert_eq!(out.terminal.selection.recommended.post_key, "1_7_8_PIPE");
        assert_eq!(out.overall_status, OverallStatus::Green);
    }

    #[test]
    fn test_not_applicable_excluded() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::builder()
            .not_applicable(115, PostGroup::Pipe, "2 7/8\" S80", 8.0)
            .build()
            .unwrap();
        let engine = EstimateEngine::new(&catalog, &tables);

        let out = engine.calculate(&scenario_a()).unwrap();
        assert_ne!(out.line.selection.recommended.post_key, "2_7_8_S80");
        assert_eq!(out.line.selection.recommended.post_key, "3_1_2_SS40");
    }

    #[test]
    fn test_pinned_posts() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut input = scenario_a();
        input.line_post_key = Some("2_3_8_SS40".to_string());
        let out = engine.calculate(&input).unwrap();
        assert_eq!(out.line.selection.recommended.post_key, "2_3_8_SS40");
        assert!(!out.line.selection.adequate);
        assert_eq!(out.overall_status, OverallStatus::Red);

        input.line_post_key = Some("NOPE".to_string());
        assert_eq!(engine.calculate(&input).unwrap_err().error_code(), "POST_NOT_FOUND");

        input.line_post_key = None;
        input.terminal_post_key = Some("C_3_1_4_X_2_1_2_X_130".to_string());
        let out = engine.calculate(&input).unwrap();
        assert_eq!(out.terminal.selection.recommended.group, PostGroup::CShape);
    }

    #[test]
    fn test_soil_only_affects_footing() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut clay = scenario_a();
        clay.soil_type = Some("clay".to_string());
        let mut rock = scenario_a();
        rock.soil_type = Some("rock_crystalline".to_string());

        let a = engine.calculate(&clay).unwrap();
        let b = engine.calculate(&rock).unwrap();
        assert_eq!(a.shared, b.shared);
        assert_eq!(a.line.selection, b.line.selection);
        assert_eq!(a.overall_status, b.overall_status);
        assert!(a.line.footing.safety_factor < b.line.footing.safety_factor);
    }

    #[test]
    fn test_quantities_when_length_known() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut input = scenario_a();
        input.fence_length_ft = Some(200.0);
        input.num_gates = 1;
        let out = engine.calculate(&input).unwrap();
        let q = out.quantities.unwrap();
        assert_eq!(q.num_line_posts, 19);
        assert_eq!(q.num_gate_posts, 2);
        // B/s = 25 -> Cf_solid interpolated above 1.5
        assert!(out.shared.pressure.cf_solid > 1.5);
    }

    #[test]
    fn test_warnings() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::builder()
            .spacing(130, PostGroup::Pipe, "4\"", 8.0, 10.0)
            .build()
            .unwrap();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut input = EstimateInput::new(180.0, 14.0, 8.0, Exposure::D);
        input.fence_type = FenceType::SolidPanel;
        let out = engine.calculate(&input).unwrap();
        let all = out.warnings.join("\n");
        assert!(all.contains("Fence height exceeds"));
        assert!(all.contains("Wind speed beyond"));
        assert!(all.contains("No spacing table for 180 mph"));
        assert!(all.contains("Post load exceeds"));
    }

    #[test]
    fn test_formula_spacing_advisory() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let out = engine.calculate(&scenario_a()).unwrap();
        assert_eq!(out.line.selection.max_spacing_ft, Some(17.94));
        assert!(!out.warnings.iter().any(|w| w.contains("max recommended spacing")));

        // Cf1 = 2.0 and Cf2 = 0.57 cap every post at 11.4 ft or less
        let input = EstimateInput::new(130.0, 4.0, 12.0, Exposure::D);
        let out = engine.calculate(&input).unwrap();
        let max = out.line.selection.max_spacing_ft.unwrap();
        assert!(max <= 11.4);
        let expected = format!(
            "For post {} at 130 mph and exposure D, max recommended spacing is about {:.2} ft; \
             current spacing 12.00 ft exceeds this simplified limit.",
            out.line.selection.recommended.post_label, max
        );
        assert!(out.warnings.contains(&expected), "{:?}", out.warnings);
    }

    #[test]
    fn test_oversized_counts_return_errors() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        let mut long = scenario_a();
        long.post_spacing_ft = 1.0;
        long.fence_length_ft = Some(1e10);
        assert_eq!(engine.calculate(&long).unwrap_err().error_code(), "INVALID_INPUT");

        let mut gates = scenario_a();
        gates.fence_length_ft = Some(200.0);
        gates.num_gates = 3_000_000_000;
        let err = engine.calculate(&gates).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("num_gates"));
    }

    #[test]
    fn test_validation_fails_fast() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);

        for mutate in [
            (|i: &mut EstimateInput| i.wind_speed_mph = 0.0) as fn(&mut EstimateInput),
            |i| i.height_total_ft = -8.0,
            |i| i.post_spacing_ft = f64::NAN,
            |i| i.importance_factor = 0.0,
            |i| i.fence_length_ft = Some(0.0),
        ] {
            let mut input = scenario_a();
            mutate(&mut input);
            let err = engine.calculate(&input).unwrap_err();
            assert!(err.is_recoverable(), "{:?}", err);
        }
    }

    #[test]
    fn test_json_input_defaults_and_output_shape() {
        let input: EstimateInput = serde_json::from_str(
            r#"{"wind_speed_mph": 115, "height_total_ft": 8, "post_spacing_ft": 10, "soil_type": "sand"}"#,
        )
        .unwrap();
        assert_eq!(input.exposure, Exposure::C);
        assert_eq!(input.risk_category, RiskCategory::II);
        assert_eq!(input.importance_factor, 1.0);

        assert!(serde_json::from_str::<EstimateInput>(
            r#"{"wind_speed_mph": 115, "height_total_ft": 8, "post_spacing_ft": 10, "exposure": "Q"}"#
        )
        .is_err());

        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let out = EstimateEngine::new(&catalog, &tables).calculate(&input).unwrap();
        let json: serde_json::Value = serde_json::to_value(&out).unwrap();
        assert!(json["shared"]["pressure_psf"].as_f64().unwrap() > 0.0);
        assert_eq!(json["line"]["recommended"]["post_label"], "2 7/8\" S80");
        assert_eq!(json["line"]["method"], "formula");
        assert_eq!(json["overall_status"], "YELLOW");

        let back: EstimateOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, out);
    }

    #[test]
    fn test_idempotent() {
        let catalog = PostCatalog::builtin();
        let tables = SpacingTableStore::empty();
        let engine = EstimateEngine::new(&catalog, &tables);
        let a = engine.calculate(&scenario_a()).unwrap();
        let b = engine.calculate(&scenario_a()).unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    proptest! {
        #[test]
        fn prop_calculate_is_deterministic(
            wind in 85.0f64..200.0,
            height in 3.0f64..20.0,
            spacing in 4.0f64..15.0,
            exposure in prop::sample::select(vec![Exposure::B, Exposure::C, Exposure::D]),
        ) {
            let catalog = PostCatalog::builtin();
            let tables = SpacingTableStore::empty();
            let engine = EstimateEngine::new(&catalog, &tables);
            let input = EstimateInput::new(wind, height, spacing, exposure);

            let a = serde_json::to_string(&engine.calculate(&input).unwrap()).unwrap();
            let b = serde_json::to_string(&engine.calculate(&input).unwrap()).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
