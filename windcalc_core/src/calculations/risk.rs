//! # Risk Classification
//!
//! Rolls two post selections up into a traffic-light status:
//!
//! - **RED**: either post is inadequate or has margin below 1.0
//! - **YELLOW**: both adequate, but a margin sits in `[1.0, green_margin)`
//!   or either post was checked by the bending formula instead of a table
//! - **GREEN**: both margins at or above `green_margin`, both from tables
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::calculations::risk::{OverallStatus, RiskClassifier};
//!
//! let worst = RiskClassifier::classify_worst([OverallStatus::Green, OverallStatus::Yellow]);
//! assert_eq!(worst, OverallStatus::Yellow);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::post_selection::{SelectionMethod, SelectionResult};

/// Margin at or above which a table result counts as comfortable
pub const DEFAULT_GREEN_MARGIN: f64 = 1.15;

/// Traffic-light verdict, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Green,
    Yellow,
    Red,
}

impl OverallStatus {
    /// Upper-case code as shown to users
    pub fn code(&self) -> &'static str {
        match self {
            OverallStatus::Green => "GREEN",
            OverallStatus::Yellow => "YELLOW",
            OverallStatus::Red => "RED",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Tunable classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Margin separating YELLOW from GREEN
    pub green_margin: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            green_margin: DEFAULT_GREEN_MARGIN,
        }
    }
}

/// Status plus the reasons behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub status: OverallStatus,
    pub reasons: Vec<String>,
}

/// Stateless classifier over a pair of selections.
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    thresholds: RiskThresholds,
}

impl RiskClassifier {
    /// Classifier with custom thresholds
    pub fn new(thresholds: RiskThresholds) -> Self {
        RiskClassifier { thresholds }
    }

    /// Thresholds in use
    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Status for one line and one terminal selection
    pub fn classify(&self, line: &SelectionResult, terminal: &SelectionResult) -> OverallStatus {
        self.status_of(line).max(self.status_of(terminal))
    }

    /// Status with human-readable reasons
    pub fn assess(&self, line: &SelectionResult, terminal: &SelectionResult) -> RiskAssessment {
        let mut reasons = Vec::new();
        for result in [line, terminal] {
            let who = format!("{} post {}", result.role, result.recommended.post_label);
            match self.status_of(result) {
                OverallStatus::Red if !result.adequate => {
                    reasons.push(format!("{}: no adequate catalog post (margin {:.2})", who, result.margin))
                }
                OverallStatus::Red => reasons.push(format!("{}: margin {:.2} below 1.00", who, result.margin)),
                OverallStatus::Yellow if result.method == SelectionMethod::Formula => reasons.push(format!(
                    "{}: checked by simplified bending formula (margin {:.2}), no spacing table value",
                    who, result.margin
                )),
                OverallStatus::Yellow => reasons.push(format!(
                    "{}: margin {:.2} below {:.2}, review recommended",
                    who, result.margin, self.thresholds.green_margin
                )),
                OverallStatus::Green => {}
            }
        }

        RiskAssessment {
            status: self.classify(line, terminal),
            reasons,
        }
    }

    /// Worst of several statuses; GREEN for none
    pub fn classify_worst<I>(statuses: I) -> OverallStatus
    where
        I: IntoIterator<Item = OverallStatus>,
    {
        statuses.into_iter().max().unwrap_or(OverallStatus::Green)
    }

    fn status_of(&self, result: &SelectionResult) -> OverallStatus {
        if !result.adequate || result.margin < 1.0 {
            OverallStatus::Red
        } else if result.margin < self.thresholds.green_margin || result.method == SelectionMethod::Formula {
            OverallStatus::Yellow
        } else {
            OverallStatus::Green
        }
    }
}
