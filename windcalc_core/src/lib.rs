//! # windcalc_core - Fence Wind-Load Estimation Engine
//!
//! `windcalc_core` estimates wind pressure on fences and selects line and
//! terminal posts that can carry it, with a clean JSON-friendly API. All
//! inputs and outputs are serde-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Reference data is built once and borrowed; calculations are pure
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Tables First**: Published spacing tables win over the bending formula
//!
//! ## Quick Start
//!
//! ```rust
//! use windcalc_core::calculations::{EstimateEngine, EstimateInput};
//! use windcalc_core::loads::Exposure;
//! use windcalc_core::materials::PostCatalog;
//! use windcalc_core::tables::SpacingTableStore;
//!
//! let catalog = PostCatalog::builtin();
//! let tables = SpacingTableStore::empty();
//! let engine = EstimateEngine::new(&catalog, &tables);
//!
//! let output = engine.calculate(&EstimateInput::new(115.0, 6.0, 10.0, Exposure::B)).unwrap();
//! let json = serde_json::to_string_pretty(&output).unwrap();
//! assert!(json.contains("overall_status"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Estimate engine, post selection, risk, footing, deflection, quantities
//! - [`loads`] - Wind pressure, fence types, ZIP wind speed lookup
//! - [`materials`] - Post catalog and section properties
//! - [`tables`] - Spacing table store and CSV loader
//! - [`project`] - Multi-segment fence projects
//! - [`settings`] - Engine settings
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON documents with atomic saves

pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod project;
pub mod settings;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{EstimateEngine, EstimateInput, EstimateOutput, OverallStatus};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_project, save_json};
pub use materials::PostCatalog;
pub use project::{calculate_project, FenceProject, RiskCategory};
pub use settings::Settings;
pub use tables::SpacingTableStore;
