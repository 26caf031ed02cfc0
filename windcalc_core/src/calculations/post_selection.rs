//! # Post Selection
//!
//! Picks the smallest catalog post that carries a given load at a given
//! spacing. Candidates are tried in ascending capacity and each one is
//! judged by the spacing table when the table has a value, otherwise by a
//! cantilever bending check:
//!
//! ```text
//! M_required  = P × (LEVER_ARM_FRACTION × H)       (in-lb, H in inches)
//! M_allowable = (Fy / Ω) × S
//! ```
//!
//! | Lookup           | Adequate when                | Margin                  |
//! |------------------|------------------------------|-------------------------|
//! | `Spacing(s)`     | s ≥ requested spacing        | s / requested           |
//! | `NotApplicable`  | never                        | 0                       |
//! | `NoEntry(_)`     | M_allowable ≥ M_required     | M_allowable / M_required|
//!
//! Formula results also carry an advisory maximum spacing from
//! [`crate::materials::spacing_factors`], since no table value exists.
//!
//! The first adequate candidate wins. When none is adequate, strict mode
//! returns [`CalcError::StructuralInadequacy`]; lenient mode returns the
//! largest candidate flagged `adequate = false`.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::calculations::post_selection::{PostRole, PostSelector, SelectionMethod, SelectionRequest};
//! use windcalc_core::loads::Exposure;
//! use windcalc_core::materials::{PostCatalog, PostGroup};
//! use windcalc_core::tables::SpacingTableStore;
//!
//! let catalog = PostCatalog::builtin();
//! let tables = SpacingTableStore::empty();
//! let selector = PostSelector::new(&catalog, &tables);
//!
//! let request = SelectionRequest {
//!     group: PostGroup::Pipe,
//!     load_per_post_lb: 513.7,
//!     requested_spacing_ft: 10.0,
//!     height_ft: 8.0,
//!     wind_speed_mph: 115.0,
//!     exposure: Exposure::C,
//!     role: PostRole::Line,
//! };
//! let result = selector.select(&request, false).unwrap();
//! assert_eq!(result.method, SelectionMethod::Formula);
//! assert!(result.adequate);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{require_positive, CalcError, CalcResult};
use crate::loads::Exposure;
use crate::materials::{advisory_max_spacing, PostCatalog, PostGroup, PostSpec};
use crate::tables::{LookupOutcome, SpacingTableStore};
use crate::units::{Feet, FtLb, InLb, Inches};

/// Effective cantilever arm as a fraction of fence height
pub const LEVER_ARM_FRACTION: f64 = 0.6;

/// Line or terminal post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostRole {
    /// Intermediate post braced by spans on both sides
    Line,
    /// End, corner or gate post
    Terminal,
}

impl std::fmt::Display for PostRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostRole::Line => write!(f, "line"),
            PostRole::Terminal => write!(f, "terminal"),
        }
    }
}

/// How a candidate was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Published spacing table
    Table,
    /// Bending capacity fallback
    Formula,
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMethod::Table => write!(f, "table"),
            SelectionMethod::Formula => write!(f, "formula"),
        }
    }
}

/// Demand on one post.
///
/// ## JSON Example
///
/// ```json
/// {
///   "group": "pipe",
///   "load_per_post_lb": 513.7,
///   "requested_spacing_ft": 10.0,
///   "height_ft": 8.0,
///   "wind_speed_mph": 115.0,
///   "role": "line"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Post family to search
    pub group: PostGroup,

    /// Horizontal wind load on the post (lb)
    pub load_per_post_lb: f64,

    /// Post spacing the user wants (ft)
    pub requested_spacing_ft: f64,

    /// Fence height above grade (ft)
    pub height_ft: f64,

    /// Basic wind speed, used for the table lookup (mph)
    pub wind_speed_mph: f64,

    /// Exposure category, used for the advisory spacing on formula results
    pub exposure: Exposure,

    /// Line or terminal
    pub role: PostRole,
}

impl SelectionRequest {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("load_per_post_lb", self.load_per_post_lb)?;
        require_positive("post_spacing_ft", self.requested_spacing_ft)?;
        require_positive("height_total_ft", self.height_ft)?;
        require_positive("wind_speed_mph", self.wind_speed_mph)?;
        Ok(())
    }

    /// Lever arm from grade to the resultant (in)
    pub fn lever_arm(&self) -> Inches {
        Inches::from(Feet(self.height_ft * LEVER_ARM_FRACTION))
    }

    /// Base moment the post must resist (in-lb)
    pub fn required_moment(&self) -> InLb {
        InLb(self.load_per_post_lb * self.lever_arm().value())
    }
}

/// Summary of the chosen post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedPost {
    /// Catalog key
    pub post_key: String,
    /// Table label, e.g. `2 3/8"`
    pub post_label: String,
    /// Human-friendly name
    pub display_name: String,
    /// Post family
    pub group: PostGroup,
    /// Capacity rank within the family, 1 = smallest
    pub rank: usize,
}

impl From<&PostSpec> for RecommendedPost {
    fn from(spec: &PostSpec) -> Self {
        RecommendedPost {
            post_key: spec.key.clone(),
            post_label: spec.label.clone(),
            display_name: spec.display_name.clone(),
            group: spec.group(),
            rank: spec.rank,
        }
    }
}

/// Outcome of selecting (or checking) one post.
///
/// ## JSON Example
///
/// ```json
/// {
///   "role": "line",
///   "recommended": {
///     "post_key": "2_7_8_S80",
///     "post_label": "2 7/8\" S80",
///     "display_name": "2-7/8\" Schedule 80 Pipe",
///     "group": "pipe",
///     "rank": 5
///   },
///   "method": "formula",
///   "margin": 1.35,
///   "adequate": true,
///   "max_spacing_ft": 17.94,
///   "required_moment_ft_lb": 2465.9,
///   "allowable_moment_ft_lb": 3339.8
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Line or terminal
    pub role: PostRole,

    /// Chosen post
    pub recommended: RecommendedPost,

    /// How the chosen post was judged
    pub method: SelectionMethod,

    /// Capacity over demand; 1.0 is the adequacy boundary
    pub margin: f64,

    /// False only for a degraded result
    pub adequate: bool,

    /// Table maximum spacing, or the advisory Cf-based maximum on formula results
    pub max_spacing_ft: Option<f64>,

    /// Required moment (formula method only)
    pub required_moment_ft_lb: Option<f64>,

    /// Allowable moment of the chosen post
    pub allowable_moment_ft_lb: f64,
}

impl SelectionResult {
    /// Check if the post passes
    pub fn passes(&self) -> bool {
        self.adequate && self.margin >= 1.0
    }
}

/// Chooses posts from a catalog, consulting spacing tables first.
///
/// Holds only shared references, so one selector can serve many threads.
#[derive(Debug, Clone, Copy)]
pub struct PostSelector<'a> {
    catalog: &'a PostCatalog,
    tables: &'a SpacingTableStore,
}

impl<'a> PostSelector<'a> {
    /// Create a selector over a catalog and table store
    pub fn new(catalog: &'a PostCatalog, tables: &'a SpacingTableStore) -> Self {
        PostSelector { catalog, tables }
    }

    /// Select the smallest adequate post for a request.
    ///
    /// # Returns
    ///
    /// * `Ok(SelectionResult)` - Adequate post, or the largest post flagged
    ///   inadequate when `strict` is false
    /// * `Err(CalcError::StructuralInadequacy)` - Nothing adequate and `strict`
    /// * `Err(CalcError::InvalidInput)` - Non-positive demand values
    pub fn select(&self, request: &SelectionRequest, strict: bool) -> CalcResult<SelectionResult> {
        request.validate()?;

        let candidates = self.catalog.candidates(request.group);
        let Some(largest) = candidates.last() else {
            return Err(CalcError::catalog(format!("No posts in group {}", request.group)));
        };

        for spec in candidates {
            let result = self.judge(spec, request);
            if result.adequate {
                debug!(
                    role = %request.role,
                    post = %spec.key,
                    method = %result.method,
                    margin = result.margin,
                    "selected post"
                );
                return Ok(result);
            }
        }

        self.exhausted(largest, request, strict)
    }

    /// Check one fixed post against a request.
    ///
    /// Used when the caller pins a post. An inadequate post is an error in
    /// strict mode and a flagged result otherwise.
    pub fn evaluate(&self, spec: &PostSpec, request: &SelectionRequest, strict: bool) -> CalcResult<SelectionResult> {
        request.validate()?;
        let result = self.judge(spec, request);
        if result.adequate {
            return Ok(result);
        }
        if strict {
            return Err(inadequacy_error(request, &format!("specified post {} is not adequate", spec.key)));
        }
        warn!(role = %request.role, post = %spec.key, margin = result.margin, "specified post is not adequate");
        Ok(result)
    }

    fn exhausted(&self, largest: &PostSpec, request: &SelectionRequest, strict: bool) -> CalcResult<SelectionResult> {
        if strict {
            return Err(inadequacy_error(request, "no catalog post is adequate"));
        }

        let result = self.judge(largest, request);
        warn!(
            role = %request.role,
            group = %request.group,
            load_lb = request.load_per_post_lb,
            spacing_ft = request.requested_spacing_ft,
            post = %largest.key,
            "no adequate post; returning largest candidate"
        );
        Ok(SelectionResult { adequate: false, ..result })
    }

    /// Judge a single candidate. Table values take priority over the formula.
    fn judge(&self, spec: &PostSpec, request: &SelectionRequest) -> SelectionResult {
        let allowable = spec.allowable_moment();
        let base = |method, margin: f64, adequate, max_spacing_ft, required_moment_ft_lb| SelectionResult {
            role: request.role,
            recommended: RecommendedPost::from(spec),
            method,
            margin,
            adequate,
            max_spacing_ft,
            required_moment_ft_lb,
            allowable_moment_ft_lb: FtLb::from(allowable).value(),
        };

        match self
            .tables
            .lookup(request.wind_speed_mph, spec.group(), &spec.label, request.height_ft)
        {
            LookupOutcome::Spacing(max_spacing_ft) => {
                let margin = max_spacing_ft / request.requested_spacing_ft;
                base(
                    SelectionMethod::Table,
                    margin,
                    max_spacing_ft >= request.requested_spacing_ft,
                    Some(max_spacing_ft),
                    None,
                )
            }
            LookupOutcome::NotApplicable => base(SelectionMethod::Table, 0.0, false, None, None),
            LookupOutcome::NoEntry(gap) => {
                let required = request.required_moment();
                debug!(post = %spec.key, ?gap, "no table value; using bending formula");
                base(
                    SelectionMethod::Formula,
                    allowable.value() / required.value(),
                    allowable >= required,
                    Some(advisory_max_spacing(spec, request.wind_speed_mph, request.exposure)),
                    Some(FtLb::from(required).value()),
                )
            }
        }
    }
}

fn inadequacy_error(request: &SelectionRequest, reason: &str) -> CalcError {
    CalcError::structural_inadequacy(
        request.role.to_string(),
        request.group.to_string(),
        format!(
            "{:.0} lb at {:.1} ft spacing, {:.1} ft height",
            request.load_per_post_lb, request.requested_spacing_ft, request.height_ft
        ),
        reason,
    )
}
