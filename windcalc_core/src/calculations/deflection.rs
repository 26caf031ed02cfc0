//! Post tip deflection (serviceability, advisory).
//!
//! The post is a cantilever fixed at grade carrying its tributary load as a
//! uniform load over the fence height:
//!
//! ```text
//! δ = P·L³ / (8·E·I)      limit L/60
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CalcResult};
use crate::materials::{PostSpec, E_STEEL_KSI};
use crate::units::{Feet, Inches, Ksi, Psi};

/// Deflection limit as a span ratio (L/60)
pub const DEFLECTION_LIMIT_RATIO: f64 = 60.0;

/// Results from a deflection check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeflectionResult {
    /// Tip deflection (in)
    pub deflection_in: f64,
    /// L/60 (in)
    pub allowable_in: f64,
    /// deflection / allowable
    pub ratio: f64,
    pub deflection_ok: bool,
}

/// Check tip deflection of a post under its tributary load.
pub fn calculate(post: &PostSpec, height_ft: f64, load_per_post_lb: f64) -> CalcResult<DeflectionResult> {
    require_positive("height_total_ft", height_ft)?;
    require_positive("load_per_post_lb", load_per_post_lb)?;

    let length_in = Inches::from(Feet(height_ft)).value();
    let e_psi = Psi::from(Ksi(E_STEEL_KSI)).value();
    let i_in4 = post.section.moment_of_inertia().value();

    let deflection_in = load_per_post_lb * length_in.powi(3) / (8.0 * e_psi * i_in4);
    let allowable_in = length_in / DEFLECTION_LIMIT_RATIO;

    Ok(DeflectionResult {
        deflection_in,
        allowable_in,
        ratio: deflection_in / allowable_in,
        deflection_ok: deflection_in <= allowable_in,
    })
}
