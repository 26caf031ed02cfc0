//! Engine settings.
//!
//! A plain value. The core never reads the environment; front ends resolve
//! settings from files, environment variables and flags, then hand the
//! result to [`EstimateEngine::with_settings`](crate::calculations::EstimateEngine::with_settings).
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "strict_footing": false,
//!   "table_dir": "tables",
//!   "risk": { "green_margin": 1.15 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calculations::risk::RiskThresholds;
use crate::errors::{require_positive, CalcResult};

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Treat an inadequate post as an error instead of a flagged result
    pub strict_footing: bool,

    /// Directory of `<speed>mph.csv` spacing tables
    pub table_dir: Option<PathBuf>,

    /// Risk classification thresholds
    pub risk: RiskThresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            strict_footing: false,
            table_dir: None,
            risk: RiskThresholds::default(),
        }
    }
}

impl Settings {
    /// Validate settings values.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("risk.green_margin", self.risk.green_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.strict_footing);
        assert!(settings.table_dir.is_none());
        assert_eq!(settings.risk.green_margin, 1.15);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"strict_footing": true}"#).unwrap();
        assert!(settings.strict_footing);
        assert_eq!(settings.risk, RiskThresholds::default());

        let settings: Settings = serde_json::from_str(r#"{"risk": {"green_margin": 1.3}}"#).unwrap();
        assert_eq!(settings.risk.green_margin, 1.3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut settings = Settings::default();
        settings.risk.green_margin = 0.0;
        assert!(settings.validate().is_err());
    }
}
