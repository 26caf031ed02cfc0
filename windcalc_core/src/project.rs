//! # Fence Projects
//!
//! A `FenceProject` groups several fence runs that share one site: wind
//! speed, exposure, risk category and soil. Each run (a `FenceSegment`)
//! carries its own geometry and is estimated independently; the project
//! status is the worst segment status and quantities are summed.
//!
//! Projects are plain JSON documents (see [`crate::file_io::load_project`]).
//!
//! ## Structure
//!
//! ```text
//! FenceProject
//! ├── name, version
//! ├── site: wind_speed_mph, exposure, risk_category, importance_factor, kzt, soil_type
//! ├── footing overrides: embedment_depth_in, footing_diameter_in
//! └── segments: Vec<FenceSegment> (label, length, height, spacing, fence type, ...)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::calculations::EstimateEngine;
//! use windcalc_core::loads::Exposure;
//! use windcalc_core::materials::PostCatalog;
//! use windcalc_core::project::{calculate_project, FenceProject, FenceSegment};
//! use windcalc_core::tables::SpacingTableStore;
//!
//! let mut project = FenceProject::new("Backyard", 115.0, Exposure::C);
//! project.add_segment(FenceSegment::new("North run", 120.0, 6.0, 10.0));
//! project.add_segment(FenceSegment::new("East run", 80.0, 6.0, 10.0));
//!
//! let catalog = PostCatalog::builtin();
//! let tables = SpacingTableStore::empty();
//! let engine = EstimateEngine::new(&catalog, &tables);
//!
//! let output = calculate_project(&engine, &project).unwrap();
//! assert_eq!(output.segments.len(), 2);
//! assert!(output.total_quantities.total_posts > 0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calculations::estimate::{EstimateEngine, EstimateInput, EstimateOutput};
use crate::calculations::quantities::ProjectQuantities;
use crate::calculations::risk::{OverallStatus, RiskClassifier};
use crate::errors::{require_positive, CalcError, CalcResult};
use crate::loads::{Exposure, FenceType};
use crate::materials::PostGroup;

/// Current schema version for project files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Risk category per ASCE 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    I,
    II,
    III,
    IV,
}

impl Default for RiskCategory {
    fn default() -> Self {
        RiskCategory::II
    }
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [RiskCategory::I, RiskCategory::II, RiskCategory::III, RiskCategory::IV];

    pub fn code(&self) -> &'static str {
        match self {
            RiskCategory::I => "I",
            RiskCategory::II => "II",
            RiskCategory::III => "III",
            RiskCategory::IV => "IV",
        }
    }

    /// Approximate ratio of this category's mapped wind speed to Category II
    pub fn wind_speed_multiplier(&self) -> f64 {
        match self {
            RiskCategory::I => 0.87,
            RiskCategory::II => 1.00,
            RiskCategory::III => 1.10,
            RiskCategory::IV => 1.15,
        }
    }
}

impl FromStr for RiskCategory {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        RiskCategory::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| CalcError::invalid_input("risk_category", s, "Expected I, II, III or IV"))
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_exposure() -> Exposure {
    Exposure::C
}

fn default_post_group() -> PostGroup {
    PostGroup::Pipe
}

fn one() -> f64 {
    1.0
}

/// One straight fence run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceSegment {
    /// User-provided name (e.g., "North property line")
    pub label: String,

    pub fence_length_ft: f64,

    pub height_total_ft: f64,

    pub post_spacing_ft: f64,

    #[serde(default)]
    pub fence_type: FenceType,

    #[serde(default = "default_post_group")]
    pub post_group: PostGroup,

    #[serde(default)]
    pub num_corners: u32,

    #[serde(default)]
    pub num_gates: u32,

    #[serde(default)]
    pub line_post_key: Option<String>,

    #[serde(default)]
    pub terminal_post_key: Option<String>,
}

impl FenceSegment {
    pub fn new(label: impl Into<String>, fence_length_ft: f64, height_total_ft: f64, post_spacing_ft: f64) -> Self {
        FenceSegment {
            label: label.into(),
            fence_length_ft,
            height_total_ft,
            post_spacing_ft,
            fence_type: FenceType::default(),
            post_group: PostGroup::Pipe,
            num_corners: 0,
            num_gates: 0,
            line_post_key: None,
            terminal_post_key: None,
        }
    }
}

/// Root project container.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Smith residence",
///   "wind_speed_mph": 115,
///   "exposure": "C",
///   "soil_type": "clay",
///   "segments": [
///     { "label": "North", "fence_length_ft": 120, "height_total_ft": 6, "post_spacing_ft": 10 },
///     { "label": "Pool", "fence_length_ft": 60, "height_total_ft": 8, "post_spacing_ft": 8,
///       "fence_type": "chain_link_slats", "num_gates": 1 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FenceProject {
    pub name: String,

    /// Schema version (for migration compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    pub wind_speed_mph: f64,

    #[serde(default = "default_exposure")]
    pub exposure: Exposure,

    #[serde(default)]
    pub risk_category: RiskCategory,

    #[serde(default = "one")]
    pub importance_factor: f64,

    #[serde(default = "one")]
    pub kzt: f64,

    #[serde(default)]
    pub soil_type: Option<String>,

    #[serde(default)]
    pub strict_footing: bool,

    /// Applied to every footing in every segment
    #[serde(default)]
    pub embedment_depth_in: Option<f64>,

    #[serde(default)]
    pub footing_diameter_in: Option<f64>,

    pub segments: Vec<FenceSegment>,
}

impl FenceProject {
    /// Create a project with no segments.
    pub fn new(name: impl Into<String>, wind_speed_mph: f64, exposure: Exposure) -> Self {
        FenceProject {
            name: name.into(),
            version: default_version(),
            wind_speed_mph,
            exposure,
            risk_category: RiskCategory::default(),
            importance_factor: 1.0,
            kzt: 1.0,
            soil_type: None,
            strict_footing: false,
            embedment_depth_in: None,
            footing_diameter_in: None,
            segments: Vec::new(),
        }
    }

    pub fn add_segment(&mut self, segment: FenceSegment) {
        self.segments.push(segment);
    }

    /// Validate site parameters; segment geometry is validated per estimate.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("wind_speed_mph", self.wind_speed_mph)?;
        if self.segments.is_empty() {
            return Err(CalcError::invalid_input("segments", "[]", "A project needs at least one segment"));
        }
        Ok(())
    }

    /// Estimate input for one segment with the shared site parameters.
    pub fn estimate_input(&self, segment: &FenceSegment) -> EstimateInput {
        EstimateInput {
            risk_category: self.risk_category,
            importance_factor: self.importance_factor,
            soil_type: self.soil_type.clone(),
            strict_footing: self.strict_footing,
            fence_type: segment.fence_type,
            kzt: self.kzt,
            post_group: segment.post_group,
            line_post_key: segment.line_post_key.clone(),
            terminal_post_key: segment.terminal_post_key.clone(),
            fence_length_ft: Some(segment.fence_length_ft),
            num_corners: segment.num_corners,
            num_gates: segment.num_gates,
            embedment_depth_in: self.embedment_depth_in,
            footing_diameter_in: self.footing_diameter_in,
            ..EstimateInput::new(
                self.wind_speed_mph,
                segment.height_total_ft,
                segment.post_spacing_ft,
                self.exposure,
            )
        }
    }
}

/// Estimate for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOutput {
    pub label: String,
    pub estimate: EstimateOutput,
}

/// Results for a whole project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOutput {
    pub name: String,
    pub segments: Vec<SegmentOutput>,
    /// Worst segment status
    pub overall_status: OverallStatus,
    pub total_quantities: ProjectQuantities,
}

/// Estimate every segment of a project.
///
/// Fails on the first segment that fails; invalid-input errors name the
/// segment index in their field (e.g., `segments[1].post_spacing_ft`).
pub fn calculate_project(engine: &EstimateEngine<'_>, project: &FenceProject) -> CalcResult<ProjectOutput> {
    project.validate()?;

    let segments = project
        .segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            engine
                .calculate(&project.estimate_input(segment))
                .map(|estimate| SegmentOutput {
                    label: segment.label.clone(),
                    estimate,
                })
                .map_err(|e| in_segment(i, e))
        })
        .collect::<CalcResult<Vec<_>>>()?;

    let overall_status = RiskClassifier::classify_worst(segments.iter().map(|s| s.estimate.overall_status));
    let total_quantities =
        ProjectQuantities::from_segments(segments.iter().filter_map(|s| s.estimate.quantities.as_ref()))?;

    Ok(ProjectOutput {
        name: project.name.clone(),
        segments,
        overall_status,
        total_quantities,
    })
}

fn in_segment(index: usize, error: CalcError) -> CalcError {
    match error {
        CalcError::InvalidInput { field, value, reason } => CalcError::InvalidInput {
            field: format!("segments[{}].{}", index, field),
            value,
            reason,
        },
        other => other,
    }
}
