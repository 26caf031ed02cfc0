//! # Materials Database
//!
//! Steel fence post sections and the properties the selector needs.
//!
//! ## Post Groups
//!
//! - **Pipe**: round pipe, SS40 and Schedule 80 (ASTM F1083)
//! - **C-Shape**: cold-rolled C-sections (ASTM F1043 Group II)
//!
//! [`spacing_factors`] gives an advisory maximum spacing per post when no
//! spacing table covers it.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::materials::{PostCatalog, PostGroup};
//!
//! let catalog = PostCatalog::builtin();
//! for post in catalog.candidates(PostGroup::CShape) {
//!     println!("{}", post);
//! }
//! ```

pub mod post_catalog;
pub mod spacing_factors;

pub use post_catalog::{PostCatalog, PostGroup, PostSection, PostSpec, E_STEEL_KSI, OMEGA_B};
pub use spacing_factors::advisory_max_spacing;
