//! # Fence Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! Post selection and the estimate engine borrow the catalog and spacing
//! tables instead of owning them, so they carry a lifetime.
//!
//! ## Available Calculations
//!
//! - [`estimate`] - Full estimate: pressure, posts, status, checks
//! - [`post_selection`] - Smallest adequate post for a load
//! - [`risk`] - GREEN / YELLOW / RED classification
//! - [`footing`] - Embedded pier overturning check (IBC 1807.3)
//! - [`deflection`] - Post tip deflection (L/60)
//! - [`quantities`] - Post counts and materials per run
//! - [`concrete`] - Concrete volume and bag count for post holes

pub mod concrete;
pub mod deflection;
pub mod estimate;
pub mod footing;
pub mod post_selection;
pub mod quantities;
pub mod risk;

// Re-export commonly used types
pub use concrete::{ConcreteInput, ConcreteResult, HoleSpec};
pub use deflection::DeflectionResult;
pub use estimate::{EstimateEngine, EstimateInput, EstimateOutput, PostBlock, SharedResult};
pub use footing::{FootingInput, FootingResult, SoilClass};
pub use post_selection::{
    PostRole, PostSelector, RecommendedPost, SelectionMethod, SelectionRequest, SelectionResult,
    LEVER_ARM_FRACTION,
};
pub use quantities::{FootingSize, ProjectQuantities, QuantityInput, SegmentQuantities};
pub use risk::{OverallStatus, RiskAssessment, RiskClassifier, RiskThresholds};
