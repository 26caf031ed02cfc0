//! Approximate basic wind speed from a US ZIP code.
//!
//! Keyed on the 3-digit ZIP prefix. Base values are Risk Category II speeds
//! read off the ASCE 7-22 wind maps at regional resolution and scaled for
//! the other categories. This is an estimating aid: coastal prefixes in
//! particular can vary a lot inside one prefix, so project drawings or the
//! hazard maps govern.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::project::RiskCategory;

/// Risk Category II speed (mph) and region name per ZIP prefix
static ZIP_WIND_MAP: Lazy<HashMap<u16, (u32, &'static str)>> = Lazy::new(|| {
    // Later ranges override earlier ones.
    let ranges: &[(u16, u16, u32, &'static str)] = &[
        (320, 340, 150, "Florida"),
        (330, 335, 170, "South Florida Coast"),
        (339, 340, 160, "Florida Keys"),
        (700, 715, 130, "Louisiana"),
        (770, 780, 130, "Texas Gulf Coast"),
        (780, 800, 115, "Texas Interior"),
        (386, 398, 120, "Mississippi"),
        (350, 370, 115, "Alabama"),
        (270, 290, 130, "North Carolina Coast"),
        (290, 300, 130, "South Carolina"),
        (300, 320, 120, "Georgia"),
        (220, 247, 115, "Virginia"),
        (230, 237, 125, "Virginia Tidewater"),
        (200, 220, 115, "DC / Maryland"),
        (206, 219, 115, "Maryland"),
        (100, 150, 110, "New York"),
        (150, 200, 105, "Pennsylvania"),
        (10, 70, 115, "New England"),
        (70, 90, 110, "New Jersey / Connecticut"),
        (400, 430, 105, "Kentucky"),
        (430, 460, 105, "Ohio"),
        (460, 480, 105, "Indiana"),
        (480, 500, 105, "Michigan"),
        (500, 530, 105, "Iowa / Minnesota"),
        (530, 550, 105, "Wisconsin"),
        (550, 570, 105, "Minnesota"),
        (570, 590, 115, "South Dakota"),
        (590, 600, 105, "Montana"),
        (600, 630, 105, "Illinois"),
        (630, 660, 105, "Missouri"),
        (660, 680, 115, "Kansas"),
        (680, 700, 115, "Nebraska"),
        (800, 840, 110, "Colorado / Wyoming"),
        (840, 850, 105, "Utah"),
        (850, 870, 105, "Arizona"),
        (870, 885, 110, "New Mexico"),
        (900, 935, 95, "California (Southern)"),
        (935, 970, 95, "California (Northern)"),
        (970, 980, 95, "Oregon"),
        (980, 995, 95, "Washington"),
        (995, 1000, 120, "Alaska"),
        (967, 968, 105, "Hawaii"),
        (968, 969, 130, "Hawaii (Windward)"),
    ];

    let mut map = HashMap::new();
    for &(start, end, speed, region) in ranges {
        for prefix in start..end {
            map.insert(prefix, (speed, region));
        }
    }
    map
});

/// Outcome of a ZIP lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindSpeedLookup {
    /// Basic wind speed for the risk category, whole mph; `None` if unknown
    pub wind_speed_mph: Option<u32>,

    /// Region name, or the reason no speed was found
    pub region: String,
}

/// Look up an approximate design wind speed for a ZIP code.
///
/// ```rust
/// use windcalc_core::loads::lookup_wind_speed;
/// use windcalc_core::project::RiskCategory;
///
/// let hit = lookup_wind_speed("33101", RiskCategory::II);
/// assert_eq!(hit.wind_speed_mph, Some(170));
///
/// let miss = lookup_wind_speed("12", RiskCategory::II);
/// assert_eq!(miss.wind_speed_mph, None);
/// ```
pub fn lookup_wind_speed(zip_code: &str, risk_category: RiskCategory) -> WindSpeedLookup {
    let zip = zip_code.trim();
    let Some(prefix) = zip.get(..3) else {
        return WindSpeedLookup {
            wind_speed_mph: None,
            region: "Invalid ZIP code".to_string(),
        };
    };

    let entry = prefix
        .parse::<u16>()
        .ok()
        .filter(|_| prefix.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|p| ZIP_WIND_MAP.get(&p));

    match entry {
        Some(&(base, region)) => {
            let speed = (f64::from(base) * risk_category.wind_speed_multiplier()).round() as u32;
            WindSpeedLookup {
                wind_speed_mph: Some(speed),
                region: region.to_string(),
            }
        }
        None => WindSpeedLookup {
            wind_speed_mph: None,
            region: "ZIP code region not in database".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_florida_overrides() {
        assert_eq!(lookup_wind_speed("32801", RiskCategory::II).wind_speed_mph, Some(150));
        assert_eq!(lookup_wind_speed("33101", RiskCategory::II).region, "South Florida Coast");
        assert_eq!(lookup_wind_speed("33901", RiskCategory::II).wind_speed_mph, Some(160));
    }

    #[test]
    fn test_hawaii_overrides_california() {
        let hit = lookup_wind_speed("96813", RiskCategory::II);
        assert_eq!(hit.wind_speed_mph, Some(130));
        assert_eq!(hit.region, "Hawaii (Windward)");
    }

    #[test]
    fn test_leading_zero_prefixes() {
        let hit = lookup_wind_speed("02108", RiskCategory::II);
        assert_eq!(hit.wind_speed_mph, Some(115));
        assert_eq!(hit.region, "New England");
        assert_eq!(lookup_wind_speed("07030", RiskCategory::II).wind_speed_mph, Some(110));
    }

    #[test]
    fn test_risk_category_scaling() {
        // 115 × 0.87 = 100.05, 115 × 1.15 = 132.25
        assert_eq!(lookup_wind_speed("78701", RiskCategory::I).wind_speed_mph, Some(100));
        assert_eq!(lookup_wind_speed("78701", RiskCategory::III).wind_speed_mph, Some(127));
        assert_eq!(lookup_wind_speed("78701", RiskCategory::IV).wind_speed_mph, Some(132));
    }

    #[test]
    fn test_misses() {
        let short = lookup_wind_speed("12", RiskCategory::II);
        assert_eq!(short.wind_speed_mph, None);
        assert_eq!(short.region, "Invalid ZIP code");

        let unknown = lookup_wind_speed("00501", RiskCategory::II);
        assert_eq!(unknown.region, "ZIP code region not in database");

        assert_eq!(lookup_wind_speed("ABCDE", RiskCategory::II).wind_speed_mph, None);
    }
}
