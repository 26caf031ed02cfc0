//! Fence Post Catalog
//!
//! Section properties for the steel fence posts the estimator can recommend.
//! The catalog is reference data: it is built once, validated, and then only
//! read. Engines borrow it; nothing mutates it after construction.
//!
//! ## Post Groups
//!
//! - **Pipe**: round steel pipe per ASTM F1083 (Group IC, SS40 and Schedule 80).
//!   Section modulus and moment of inertia are derived from OD and wall.
//! - **C-shape**: cold-rolled C-sections per ASTM F1043 (Group II). Section
//!   properties are nominal manufacturer values carried directly.
//!
//! ## Ordering
//!
//! Within a group, [`PostCatalog::candidates`] yields posts in strictly
//! increasing allowable moment. The selector relies on this: the first
//! adequate candidate is the smallest adequate one.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::materials::{PostCatalog, PostGroup};
//!
//! let catalog = PostCatalog::builtin();
//! let pipes = catalog.candidates(PostGroup::Pipe);
//! assert!(pipes.windows(2).all(|w| w[0].allowable_moment() < w[1].allowable_moment()));
//!
//! let post = catalog.get("2_3_8_SS40").unwrap();
//! assert_eq!(post.label, "2 3/8\"");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;
use std::str::FromStr;

use crate::errors::{CalcError, CalcResult};
use crate::units::{In3, In4, InLb, Ksi, Psi};

/// ASD safety factor for flexure (AISC F1)
pub const OMEGA_B: f64 = 1.67;

/// Modulus of elasticity for steel (ksi)
pub const E_STEEL_KSI: f64 = 29_000.0;

/// Post shape family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PostGroup {
    /// Round steel pipe (ASTM F1083 Group IC)
    #[serde(rename = "pipe")]
    Pipe,
    /// Cold-rolled C-section (ASTM F1043 Group II)
    #[serde(rename = "c-shape")]
    CShape,
}

impl PostGroup {
    /// All groups for iteration
    pub const ALL: [PostGroup; 2] = [PostGroup::Pipe, PostGroup::CShape];

    /// Parse from a table or user code.
    ///
    /// Accepts the short codes (`pipe`, `c-shape`) and the ASTM group codes
    /// used in spacing tables (`IC_PIPE`, `II_CSHAPE`).
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "PIPE" | "IC_PIPE" | "IC" => Some(PostGroup::Pipe),
            "C_SHAPE" | "CSHAPE" | "II_CSHAPE" | "II_C_SHAPE" | "II" => Some(PostGroup::CShape),
            _ => None,
        }
    }

    /// Short code used in JSON and tables
    pub fn code(&self) -> &'static str {
        match self {
            PostGroup::Pipe => "pipe",
            PostGroup::CShape => "c-shape",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PostGroup::Pipe => "Steel Pipe (Group IC)",
            PostGroup::CShape => "C-Shape (Group II)",
        }
    }
}

impl FromStr for PostGroup {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostGroup::from_code(s)
            .ok_or_else(|| CalcError::invalid_input("post_group", s, "Expected 'pipe' or 'c-shape'"))
    }
}

impl std::fmt::Display for PostGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Cross-section of a post.
///
/// A closed set: pipes derive their properties from geometry, C-shapes carry
/// tabulated values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostSection {
    /// Hollow circular section
    Pipe {
        /// Outside diameter (in)
        od_in: f64,
        /// Wall thickness (in)
        wall_in: f64,
    },
    /// Cold-rolled channel, strong-axis properties
    CShape {
        /// Elastic section modulus Sx (in³)
        sx_in3: f64,
        /// Moment of inertia Ix (in⁴)
        ix_in4: f64,
    },
}

impl PostSection {
    /// Group this section belongs to
    pub fn group(&self) -> PostGroup {
        match self {
            PostSection::Pipe { .. } => PostGroup::Pipe,
            PostSection::CShape { .. } => PostGroup::CShape,
        }
    }

    /// Elastic section modulus S (in³)
    pub fn section_modulus(&self) -> In3 {
        match *self {
            PostSection::Pipe { od_in, wall_in } => {
                let id = od_in - 2.0 * wall_in;
                In3(PI * (od_in.powi(4) - id.powi(4)) / (32.0 * od_in))
            }
            PostSection::CShape { sx_in3, .. } => In3(sx_in3),
        }
    }

    /// Moment of inertia I (in⁴)
    pub fn moment_of_inertia(&self) -> In4 {
        match *self {
            PostSection::Pipe { od_in, wall_in } => {
                let id = od_in - 2.0 * wall_in;
                In4(PI * (od_in.powi(4) - id.powi(4)) / 64.0)
            }
            PostSection::CShape { ix_in4, .. } => In4(ix_in4),
        }
    }

    fn validate(&self, key: &str) -> CalcResult<()> {
        let ok = match *self {
            PostSection::Pipe { od_in, wall_in } => {
                od_in.is_finite() && wall_in.is_finite() && wall_in > 0.0 && 2.0 * wall_in < od_in
            }
            PostSection::CShape { sx_in3, ix_in4 } => {
                sx_in3.is_finite() && ix_in4.is_finite() && sx_in3 > 0.0 && ix_in4 > 0.0
            }
        };
        if ok {
            Ok(())
        } else {
            Err(CalcError::catalog(format!("Post '{}' has invalid section properties", key)))
        }
    }
}

/// A fence post with its structural and footing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSpec {
    /// Catalog key (e.g., "2_3_8_SS40")
    pub key: String,

    /// Row label used in spacing tables (e.g., `2 3/8"`)
    pub label: String,

    /// Human-friendly name (e.g., `2-3/8" SS40 Pipe`)
    pub display_name: String,

    /// Capacity rank within the group, 1 = smallest. Assigned by the catalog.
    #[serde(default)]
    pub rank: usize,

    /// Cross-section
    pub section: PostSection,

    /// Yield strength Fy (ksi)
    pub fy_ksi: f64,

    /// Default footing diameter (in)
    pub footing_diameter_in: f64,

    /// Default footing embedment depth (in)
    pub footing_embedment_in: f64,

    /// Base spacing before wind and exposure factors (ft)
    #[serde(default = "default_spacing_base_ft")]
    pub spacing_base_ft: f64,
}

fn default_spacing_base_ft() -> f64 {
    8.0
}

impl PostSpec {
    /// Create a round pipe post
    pub fn pipe(
        key: &str,
        label: &str,
        display_name: &str,
        od_in: f64,
        wall_in: f64,
        footing: (f64, f64),
    ) -> Self {
        PostSpec {
            key: key.to_string(),
            label: label.to_string(),
            display_name: display_name.to_string(),
            rank: 0,
            section: PostSection::Pipe { od_in, wall_in },
            fy_ksi: 50.0,
            footing_diameter_in: footing.0,
            footing_embedment_in: footing.1,
            spacing_base_ft: default_spacing_base_ft(),
        }
    }

    /// Create a C-shape post
    pub fn c_shape(
        key: &str,
        label: &str,
        display_name: &str,
        sx_in3: f64,
        ix_in4: f64,
        footing: (f64, f64),
    ) -> Self {
        PostSpec {
            key: key.to_string(),
            label: label.to_string(),
            display_name: display_name.to_string(),
            rank: 0,
            section: PostSection::CShape { sx_in3, ix_in4 },
            fy_ksi: 50.0,
            footing_diameter_in: footing.0,
            footing_embedment_in: footing.1,
            spacing_base_ft: default_spacing_base_ft(),
        }
    }

    /// Set the base spacing used for advisory limits
    pub fn with_spacing_base(mut self, spacing_base_ft: f64) -> Self {
        self.spacing_base_ft = spacing_base_ft;
        self
    }

    /// Group of this post
    pub fn group(&self) -> PostGroup {
        self.section.group()
    }

    /// Allowable bending stress Fy / Ω (psi)
    pub fn allowable_stress(&self) -> Psi {
        Psi::from(Ksi(self.fy_ksi)) / OMEGA_B
    }

    /// Allowable bending moment = allowable stress × section modulus (in-lb)
    pub fn allowable_moment(&self) -> InLb {
        InLb(self.allowable_stress().value() * self.section.section_modulus().value())
    }
}

impl std::fmt::Display for PostSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (S={:.3} in³, M_allow={:.0} in-lb)",
            self.display_name,
            self.section.section_modulus().value(),
            self.allowable_moment().value()
        )
    }
}

/// Ordered, read-only post inventory grouped by shape family.
#[derive(Debug, Clone, Default)]
pub struct PostCatalog {
    /// Posts per group, ascending allowable moment
    by_group: BTreeMap<PostGroup, Vec<PostSpec>>,
}

impl PostCatalog {
    /// Build a catalog from arbitrary specs.
    ///
    /// Sorts each group by allowable moment, assigns ranks, and rejects
    /// invalid section or footing data, duplicate keys, and ties in capacity.
    pub fn new(specs: Vec<PostSpec>) -> CalcResult<Self> {
        let mut seen = HashSet::new();
        let mut by_group: BTreeMap<PostGroup, Vec<PostSpec>> = BTreeMap::new();

        for spec in specs {
            spec.section.validate(&spec.key)?;
            if !(spec.fy_ksi.is_finite() && spec.fy_ksi > 0.0) {
                return Err(CalcError::catalog(format!("Post '{}' has invalid Fy", spec.key)));
            }
            for (field, value) in [
                ("footing diameter", spec.footing_diameter_in),
                ("footing embedment", spec.footing_embedment_in),
                ("base spacing", spec.spacing_base_ft),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(CalcError::catalog(format!("Post '{}' has invalid {}: {}", spec.key, field, value)));
                }
            }
            if !seen.insert(spec.key.to_uppercase()) {
                return Err(CalcError::catalog(format!("Duplicate post key '{}'", spec.key)));
            }
            by_group.entry(spec.group()).or_default().push(spec);
        }

        for (group, posts) in by_group.iter_mut() {
            posts.sort_by(|a, b| a.allowable_moment().value().total_cmp(&b.allowable_moment().value()));
            for pair in posts.windows(2) {
                if pair[0].allowable_moment() >= pair[1].allowable_moment() {
                    return Err(CalcError::catalog(format!(
                        "Posts '{}' and '{}' in group {} have equal capacity",
                        pair[0].key, pair[1].key, group
                    )));
                }
            }
            for (i, post) in posts.iter_mut().enumerate() {
                post.rank = i + 1;
            }
        }

        Ok(PostCatalog { by_group })
    }

    /// Built-in catalog of standard commercial fence posts
    pub fn builtin() -> Self {
        // The built-in list satisfies every invariant checked by `new`.
        match PostCatalog::new(builtin_posts()) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("built-in post catalog is invalid: {e}"),
        }
    }

    /// Candidates for a group in ascending capacity
    pub fn candidates(&self, group: PostGroup) -> &[PostSpec] {
        self.by_group.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Largest post of a group
    pub fn largest(&self, group: PostGroup) -> Option<&PostSpec> {
        self.candidates(group).last()
    }

    /// Allowable moment for a spec (in-lb)
    pub fn allowable_moment(&self, spec: &PostSpec) -> InLb {
        spec.allowable_moment()
    }

    /// Look up a post by key (case-insensitive)
    pub fn get(&self, key: &str) -> CalcResult<&PostSpec> {
        self.iter()
            .find(|p| p.key.eq_ignore_ascii_case(key))
            .ok_or_else(|| CalcError::post_not_found(key))
    }

    /// All posts, grouped, ascending within each group
    pub fn iter(&self) -> impl Iterator<Item = &PostSpec> {
        self.by_group.values().flatten()
    }

    /// Number of posts
    pub fn len(&self) -> usize {
        self.by_group.values().map(Vec::len).sum()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Built-in Posts
// ============================================================================

fn builtin_posts() -> Vec<PostSpec> {
    // (key, table label, display name, OD, wall, footing dia, embedment, base spacing ft)
    let pipes = [
        ("1_7_8_PIPE", "1 7/8\"", "1-7/8\" Steel Pipe", 1.900, 0.120, 10.0, 24.0, 8.0),
        ("2_3_8_SS40", "2 3/8\"", "2-3/8\" SS40 Pipe", 2.375, 0.130, 10.0, 24.0, 8.0),
        ("2_3_8_S80", "2 3/8\" S80", "2-3/8\" Schedule 80 Pipe", 2.375, 0.218, 10.0, 24.0, 8.0),
        ("2_7_8_SS40", "2 7/8\"", "2-7/8\" SS40 Pipe", 2.875, 0.160, 12.0, 30.0, 10.0),
        ("2_7_8_S80", "2 7/8\" S80", "2-7/8\" Schedule 80 Pipe", 2.875, 0.276, 12.0, 30.0, 10.0),
        ("3_1_2_SS40", "3 1/2\"", "3-1/2\" SS40 Pipe", 3.500, 0.160, 16.0, 36.0, 10.0),
        ("3_1_2_S80", "3 1/2\" S80", "3-1/2\" Schedule 80 Pipe", 3.500, 0.300, 16.0, 36.0, 10.0),
        ("4_0_PIPE", "4\"", "4\" Steel Pipe", 4.000, 0.160, 18.0, 42.0, 10.0),
        ("4_0_S80", "4\" S80", "4\" Schedule 80 Pipe", 4.000, 0.318, 18.0, 42.0, 10.0),
        ("6_5_8_PIPE", "6 5/8\"", "6-5/8\" Steel Pipe", 6.625, 0.280, 24.0, 48.0, 10.0),
        ("8_5_8_PIPE", "8 5/8\"", "8-5/8\" Steel Pipe", 8.625, 0.322, 30.0, 54.0, 10.0),
    ];

    // Nominal strong-axis properties from manufacturer literature
    // (key, table label, display name, Sx, Ix, footing dia, embedment); base spacing 8 ft
    let c_shapes = [
        ("C_1_7_8_X_1_5_8_X_105", "1 7/8\" x 1 5/8\" x .105", "1-7/8\" x 1-5/8\" x .105\" C-Shape", 0.262, 0.245, 10.0, 24.0),
        ("C_1_7_8_X_1_5_8_X_121", "1 7/8\" x 1 5/8\" x .121", "1-7/8\" x 1-5/8\" x .121\" C-Shape", 0.297, 0.278, 10.0, 24.0),
        ("C_2_1_4_X_1_5_8_X_121", "2 1/4\" x 1 5/8\" x .121", "2-1/4\" x 1-5/8\" x .121\" C-Shape", 0.376, 0.423, 12.0, 30.0),
        ("C_3_1_4_X_2_1_2_X_130", "3 1/4\" x 2 1/2\" x .130", "3-1/4\" x 2-1/2\" x .130\" C-Shape", 0.853, 1.386, 14.0, 36.0),
    ];

    let mut posts: Vec<PostSpec> = pipes
        .iter()
        .map(|&(key, label, name, od, wall, dia, embed, base)| {
            PostSpec::pipe(key, label, name, od, wall, (dia, embed)).with_spacing_base(base)
        })
        .collect();

    posts.extend(
        c_shapes
            .iter()
            .map(|&(key, label, name, sx, ix, dia, embed)| PostSpec::c_shape(key, label, name, sx, ix, (dia, embed))),
    );

    posts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_parsing() {
        assert_eq!(PostGroup::from_code("pipe"), Some(PostGroup::Pipe));
        assert_eq!(PostGroup::from_code("IC_PIPE"), Some(PostGroup::Pipe));
        assert_eq!(PostGroup::from_code("c-shape"), Some(PostGroup::CShape));
        assert_eq!(PostGroup::from_code("II_CSHAPE"), Some(PostGroup::CShape));
        assert_eq!(PostGroup::from_code("IA_REG"), None);
        assert!("wood".parse::<PostGroup>().is_err());
    }

    #[test]
    fn test_group_serialization() {
        assert_eq!(serde_json::to_string(&PostGroup::CShape).unwrap(), "\"c-shape\"");
        let g: PostGroup = serde_json::from_str("\"pipe\"").unwrap();
        assert_eq!(g, PostGroup::Pipe);
    }

    #[test]
    fn test_pipe_section_properties() {
        let section = PostSection::Pipe { od_in: 2.375, wall_in: 0.130 };
        assert!((section.section_modulus().value() - 0.488).abs() < 0.001);
        assert!((section.moment_of_inertia().value() - 0.580).abs() < 0.001);
    }

    #[test]
    fn test_allowable_moment() {
        let catalog = PostCatalog::builtin();
        let post = catalog.get("2_3_8_SS40").unwrap();
        // 50,000 / 1.67 × 0.4881 ≈ 14,613 in-lb
        assert!((post.allowable_moment().value() - 14_613.0).abs() < 5.0);
        assert_eq!(catalog.allowable_moment(post), post.allowable_moment());
    }

    #[test]
    fn test_builtin_ordering_strictly_increasing() {
        let catalog = PostCatalog::builtin();
        for group in PostGroup::ALL {
            let posts = catalog.candidates(group);
            assert!(!posts.is_empty());
            for pair in posts.windows(2) {
                assert!(pair[0].allowable_moment() < pair[1].allowable_moment());
                assert!(pair[0].rank < pair[1].rank);
            }
            assert!(posts.iter().all(|p| p.group() == group));
        }
        assert_eq!(catalog.len(), 15);
    }

    #[test]
    fn test_schedule_80_stronger_than_ss40() {
        let catalog = PostCatalog::builtin();
        let ss40 = catalog.get("2_3_8_SS40").unwrap();
        let s80 = catalog.get("2_3_8_S80").unwrap();
        assert!(s80.allowable_moment() > ss40.allowable_moment());
    }

    #[test]
    fn test_largest_and_lookup() {
        let catalog = PostCatalog::builtin();
        assert_eq!(catalog.largest(PostGroup::Pipe).unwrap().key, "8_5_8_PIPE");
        assert_eq!(catalog.largest(PostGroup::CShape).unwrap().key, "C_3_1_4_X_2_1_2_X_130");
        assert_eq!(catalog.get("2_3_8_ss40").unwrap().key, "2_3_8_SS40");
        assert_eq!(
            catalog.get("NOPE").unwrap_err(),
            CalcError::post_not_found("NOPE")
        );
    }

    #[test]
    fn test_new_sorts_and_ranks() {
        let catalog = PostCatalog::new(vec![
            PostSpec::pipe("BIG", "b", "Big", 4.0, 0.2, (12.0, 30.0)),
            PostSpec::pipe("SMALL", "s", "Small", 2.0, 0.1, (10.0, 24.0)),
        ])
        .unwrap();
        let pipes = catalog.candidates(PostGroup::Pipe);
        assert_eq!(pipes[0].key, "SMALL");
        assert_eq!(pipes[0].rank, 1);
        assert_eq!(pipes[1].rank, 2);
        assert!(catalog.candidates(PostGroup::CShape).is_empty());
    }

    #[test]
    fn test_new_rejects_duplicates_and_ties() {
        let dup = PostCatalog::new(vec![
            PostSpec::pipe("A", "a", "A", 2.0, 0.1, (10.0, 24.0)),
            PostSpec::pipe("a", "a2", "A2", 3.0, 0.1, (10.0, 24.0)),
        ]);
        assert!(matches!(dup, Err(CalcError::CatalogError { .. })));

        let tie = PostCatalog::new(vec![
            PostSpec::c_shape("C1", "c1", "C1", 0.3, 0.3, (10.0, 24.0)),
            PostSpec::c_shape("C2", "c2", "C2", 0.3, 0.4, (10.0, 24.0)),
        ]);
        assert!(matches!(tie, Err(CalcError::CatalogError { .. })));
    }

    #[test]
    fn test_new_rejects_bad_sections() {
        let thick = PostCatalog::new(vec![PostSpec::pipe("X", "x", "X", 2.0, 1.2, (10.0, 24.0))]);
        assert!(thick.is_err());
        let negative = PostCatalog::new(vec![PostSpec::c_shape("Y", "y", "Y", -0.1, 0.2, (10.0, 24.0))]);
        assert!(negative.is_err());
    }

    #[test]
    fn test_new_rejects_bad_footing_and_spacing() {
        let flat = PostCatalog::new(vec![PostSpec::pipe("F", "f", "F", 2.0, 0.1, (0.0, 24.0))]);
        assert!(matches!(flat, Err(CalcError::CatalogError { .. })));

        let shallow = PostCatalog::new(vec![PostSpec::c_shape("S", "s", "S", 0.3, 0.3, (10.0, -6.0))]);
        assert!(matches!(shallow, Err(CalcError::CatalogError { .. })));

        let nan = PostCatalog::new(vec![PostSpec::pipe("N", "n", "N", 2.0, 0.1, (f64::NAN, 24.0))]);
        assert!(nan.is_err());

        let zero_base = PostSpec::pipe("Z", "z", "Z", 2.0, 0.1, (10.0, 24.0)).with_spacing_base(0.0);
        let spacing = PostCatalog::new(vec![zero_base]);
        assert!(spacing.unwrap_err().to_string().contains("base spacing"));
    }

    #[test]
    fn test_builtin_base_spacing() {
        let catalog = PostCatalog::builtin();
        assert_eq!(catalog.get("2_3_8_SS40").unwrap().spacing_base_ft, 8.0);
        assert_eq!(catalog.get("4_0_PIPE").unwrap().spacing_base_ft, 10.0);
        assert!(catalog.candidates(PostGroup::CShape).iter().all(|p| p.spacing_base_ft == 8.0));
    }

    #[test]
    fn test_post_display() {
        let catalog = PostCatalog::builtin();
        let display = format!("{}", catalog.get("4_0_PIPE").unwrap());
        assert!(display.contains("4\" Steel Pipe"));
        assert!(display.contains("in-lb"));
    }
}
