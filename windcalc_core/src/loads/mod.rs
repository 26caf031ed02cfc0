//! Wind loads on fences per ASCE 7-22 (simplified)
//!
//! # Overview
//!
//! - [`PressureCalculator`] - Velocity and design pressure from wind speed, exposure and height
//! - [`FenceType`] - Fence covering and its solidity ratio
//! - [`LoadResult`] - Tributary bay load split to line and terminal posts
//! - [`lookup_wind_speed`] - Approximate basic wind speed from a ZIP code
//!
//! # Example
//!
//! ```
//! use windcalc_core::loads::{Exposure, LoadResult, PressureCalculator};
//!
//! let pressure = PressureCalculator.compute(115.0, Exposure::C, 8.0, 1.0).unwrap();
//! let loads = LoadResult::from_pressure(pressure.design_pressure_psf, 8.0, 10.0);
//!
//! assert!(loads.terminal_load_per_post_lb > loads.load_per_post_lb);
//! println!("Line post load: {:.0} lb", loads.load_per_post_lb);
//! ```

pub mod fence_types;
pub mod pressure;
pub mod wind_speed;

pub use fence_types::{cf_solid, FenceType, CF_SOLID_LONG_FENCE};
pub use pressure::{
    Exposure, LoadResult, PressureCalculator, PressureInput, PressureResult, GUST_FACTOR,
    TERMINAL_LOAD_MULTIPLIER,
};
pub use wind_speed::{lookup_wind_speed, WindSpeedLookup};
