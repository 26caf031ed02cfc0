//! Advisory Post Spacing
//!
//! When no spacing table covers a post, the bending check decides adequacy
//! but says nothing about how far apart posts may go. This module gives a
//! simplified recommended maximum from the post's base spacing:
//!
//! ```text
//! S_max = S_base × Cf1(group, V) × Cf2(exposure) × Cf3
//! ```
//!
//! Cf1 falls as wind speed rises (clamped at both ends, linear between
//! points). Cf2 is [`Exposure::spacing_factor`]. Cf3 stays at 1.0 until a
//! height or ice adjustment is modeled.

use crate::loads::Exposure;
use crate::materials::{PostGroup, PostSpec};

/// Default Cf3 factor
pub const DEFAULT_CF3: f64 = 1.0;

/// (wind speed mph, Cf1) for round pipe (Group IC)
const CF1_PIPE: [(f64, f64); 4] = [(105.0, 3.1), (110.0, 2.8), (120.0, 2.4), (130.0, 2.0)];

/// (wind speed mph, Cf1) for C-shapes (Group II)
const CF1_C_SHAPE: [(f64, f64); 4] = [(105.0, 3.1), (110.0, 2.8), (120.0, 2.4), (130.0, 2.0)];

fn cf1_points(group: PostGroup) -> &'static [(f64, f64)] {
    match group {
        PostGroup::Pipe => &CF1_PIPE,
        PostGroup::CShape => &CF1_C_SHAPE,
    }
}

/// Wind-speed factor Cf1 for a post group
pub fn cf1(group: PostGroup, wind_speed_mph: f64) -> f64 {
    let points = cf1_points(group);
    let (first_mph, first_cf) = points[0];
    let (last_mph, last_cf) = points[points.len() - 1];
    if wind_speed_mph <= first_mph {
        return first_cf;
    }
    if wind_speed_mph >= last_mph {
        return last_cf;
    }

    points
        .windows(2)
        .find(|w| wind_speed_mph <= w[1].0)
        .map(|w| {
            let (mph_lo, cf_lo) = w[0];
            let (mph_hi, cf_hi) = w[1];
            cf_lo + (wind_speed_mph - mph_lo) / (mph_hi - mph_lo) * (cf_hi - cf_lo)
        })
        .unwrap_or(last_cf)
}

/// Recommended maximum spacing for a post (ft), rounded to 0.01 ft
pub fn advisory_max_spacing(spec: &PostSpec, wind_speed_mph: f64, exposure: Exposure) -> f64 {
    let s_max = spec.spacing_base_ft * cf1(spec.group(), wind_speed_mph) * exposure.spacing_factor() * DEFAULT_CF3;
    (s_max * 100.0).round() / 100.0
}
