//! # Spacing Tables
//!
//! Published maximum post spacings keyed by wind speed, post group, post
//! label and fence height. A table value always wins over the bending
//! formula, so the store reports *why* it has no value instead of a bare
//! `None`:
//!
//! | Outcome                          | Selector behaviour             |
//! |----------------------------------|--------------------------------|
//! | `Spacing(ft)`                    | adequate iff ft ≥ requested    |
//! | `NotApplicable`                  | candidate rejected             |
//! | `NoEntry(NoWindSpeedTable)`      | formula fallback               |
//! | `NoEntry(NoPostRow)`             | formula fallback               |
//! | `NoEntry(NoHeightColumn)`        | formula fallback               |
//!
//! Lookups are exact: wind speed must be a whole mph value with a table, and
//! the height must match a column. Nothing is interpolated.
//!
//! ## Example
//!
//! ```rust
//! use windcalc_core::materials::PostGroup;
//! use windcalc_core::tables::{LookupOutcome, SpacingTableStore};
//!
//! let tables = SpacingTableStore::builder()
//!     .spacing(115, PostGroup::Pipe, "2 3/8\"", 6.0, 10.0)
//!     .not_applicable(115, PostGroup::Pipe, "2 3/8\"", 8.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(tables.lookup(115.0, PostGroup::Pipe, "2 3/8\"", 6.0), LookupOutcome::Spacing(10.0));
//! assert_eq!(tables.lookup(115.0, PostGroup::Pipe, "2 3/8\"", 8.0), LookupOutcome::NotApplicable);
//! assert!(tables.lookup(120.0, PostGroup::Pipe, "2 3/8\"", 6.0).is_no_entry());
//! ```

pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{CalcError, CalcResult};
use crate::materials::PostGroup;

pub use loader::{load_dir, load_file};

/// Tolerance when matching a height to a table column (ft)
const HEIGHT_EPSILON: f64 = 1e-6;

/// One cell of a spacing table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "max_spacing_ft", rename_all = "snake_case")]
pub enum SpacingCell {
    /// Maximum allowable spacing (ft)
    Spacing(f64),
    /// Post cannot be used at this height
    NotApplicable,
}

/// Why a lookup found no table value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupGap {
    /// No table for this wind speed
    NoWindSpeedTable,
    /// Table exists but has no row for the post
    NoPostRow,
    /// Row exists but has no column for the height
    NoHeightColumn,
}

/// Result of a spacing lookup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// Published maximum spacing (ft)
    Spacing(f64),
    /// Published as not applicable
    NotApplicable,
    /// No published value
    NoEntry(LookupGap),
}

impl LookupOutcome {
    /// Check if the selector should fall back to the formula
    pub fn is_no_entry(&self) -> bool {
        matches!(self, LookupOutcome::NoEntry(_))
    }
}

/// Row key: post group and normalized label
type RowKey = (PostGroup, String);

/// Height columns of one row, ascending
#[derive(Debug, Clone, Default, PartialEq)]
struct SpacingRow {
    cells: Vec<(f64, SpacingCell)>,
}

impl SpacingRow {
    fn insert(&mut self, height_ft: f64, cell: SpacingCell) {
        match self.cells.iter_mut().find(|(h, _)| (*h - height_ft).abs() < HEIGHT_EPSILON) {
            Some(existing) => existing.1 = cell,
            None => {
                self.cells.push((height_ft, cell));
                self.cells.sort_by(|a, b| a.0.total_cmp(&b.0));
            }
        }
    }

    fn get(&self, height_ft: f64) -> Option<SpacingCell> {
        self.cells
            .iter()
            .find(|(h, _)| (*h - height_ft).abs() < HEIGHT_EPSILON)
            .map(|(_, cell)| *cell)
    }
}

fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read-only spacing tables for all loaded wind speeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpacingTableStore {
    tables: BTreeMap<u32, BTreeMap<RowKey, SpacingRow>>,
}

impl SpacingTableStore {
    /// Store with no tables; every lookup falls back to the formula
    pub fn empty() -> Self {
        SpacingTableStore::default()
    }

    /// Start building a store
    pub fn builder() -> SpacingTableBuilder {
        SpacingTableBuilder::default()
    }

    /// Look up the maximum spacing for a post at a height.
    pub fn lookup(&self, wind_speed_mph: f64, group: PostGroup, label: &str, height_ft: f64) -> LookupOutcome {
        let table = whole_mph(wind_speed_mph).and_then(|mph| self.tables.get(&mph));
        let Some(table) = table else {
            return LookupOutcome::NoEntry(LookupGap::NoWindSpeedTable);
        };

        let Some(row) = table.get(&(group, normalize_label(label))) else {
            return LookupOutcome::NoEntry(LookupGap::NoPostRow);
        };

        match row.get(height_ft) {
            Some(SpacingCell::Spacing(ft)) => LookupOutcome::Spacing(ft),
            Some(SpacingCell::NotApplicable) => LookupOutcome::NotApplicable,
            None => LookupOutcome::NoEntry(LookupGap::NoHeightColumn),
        }
    }

    /// Wind speeds with a table, ascending
    pub fn wind_speeds(&self) -> Vec<u32> {
        self.tables.keys().copied().collect()
    }

    /// Check if a table exists for a wind speed
    pub fn has_wind_speed(&self, wind_speed_mph: f64) -> bool {
        whole_mph(wind_speed_mph).is_some_and(|mph| self.tables.contains_key(&mph))
    }

    /// Highest wind speed with a table
    pub fn max_wind_speed(&self) -> Option<u32> {
        self.tables.keys().next_back().copied()
    }

    /// Row labels of one table as (group, label), sorted
    pub fn rows(&self, wind_speed_mph: u32) -> Vec<(PostGroup, &str)> {
        self.tables
            .get(&wind_speed_mph)
            .map(|t| t.keys().map(|(g, l)| (*g, l.as_str())).collect())
            .unwrap_or_default()
    }

    /// Heights with a column in any row of one table, ascending
    pub fn heights(&self, wind_speed_mph: u32) -> Vec<f64> {
        let mut heights: Vec<f64> = self
            .tables
            .get(&wind_speed_mph)
            .into_iter()
            .flat_map(|t| t.values())
            .flat_map(|row| row.cells.iter().map(|(h, _)| *h))
            .collect();
        heights.sort_by(f64::total_cmp);
        heights.dedup_by(|a, b| (*a - *b).abs() < HEIGHT_EPSILON);
        heights
    }

    /// Number of wind-speed tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no tables are loaded
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn whole_mph(wind_speed_mph: f64) -> Option<u32> {
    if wind_speed_mph.is_finite() && wind_speed_mph > 0.0 && wind_speed_mph.fract() == 0.0 && wind_speed_mph <= f64::from(u32::MAX) {
        Some(wind_speed_mph as u32)
    } else {
        None
    }
}

/// Accumulates cells, validated on [`SpacingTableBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct SpacingTableBuilder {
    cells: Vec<(u32, PostGroup, String, f64, SpacingCell)>,
}

impl SpacingTableBuilder {
    /// Add a cell. A later cell for the same key replaces an earlier one.
    pub fn cell(mut self, wind_speed_mph: u32, group: PostGroup, label: &str, height_ft: f64, cell: SpacingCell) -> Self {
        self.push(wind_speed_mph, group, label, height_ft, cell);
        self
    }

    /// Add a numeric spacing cell
    pub fn spacing(self, wind_speed_mph: u32, group: PostGroup, label: &str, height_ft: f64, max_spacing_ft: f64) -> Self {
        self.cell(wind_speed_mph, group, label, height_ft, SpacingCell::Spacing(max_spacing_ft))
    }

    /// Add a not-applicable cell
    pub fn not_applicable(self, wind_speed_mph: u32, group: PostGroup, label: &str, height_ft: f64) -> Self {
        self.cell(wind_speed_mph, group, label, height_ft, SpacingCell::NotApplicable)
    }

    pub(crate) fn push(&mut self, wind_speed_mph: u32, group: PostGroup, label: &str, height_ft: f64, cell: SpacingCell) {
        self.cells.push((wind_speed_mph, group, label.to_string(), height_ft, cell));
    }

    /// Merge another builder's cells after this one's
    pub fn merge(mut self, other: SpacingTableBuilder) -> Self {
        self.cells.extend(other.cells);
        self
    }

    /// Validate and freeze the tables
    pub fn build(self) -> CalcResult<SpacingTableStore> {
        let mut tables: BTreeMap<u32, BTreeMap<RowKey, SpacingRow>> = BTreeMap::new();

        for (mph, group, label, height_ft, cell) in self.cells {
            let key = normalize_label(&label);
            let context = || format!("{}mph/{}/{}", mph, group, key);

            if mph == 0 {
                return Err(CalcError::table(context(), "Wind speed must be positive"));
            }
            if key.is_empty() {
                return Err(CalcError::table(context(), "Post label is empty"));
            }
            if !(height_ft.is_finite() && height_ft > 0.0) {
                return Err(CalcError::table(context(), format!("Invalid height {}", height_ft)));
            }
            if let SpacingCell::Spacing(ft) = cell {
                if !(ft.is_finite() && ft > 0.0) {
                    return Err(CalcError::table(context(), format!("Invalid spacing {} at {} ft", ft, height_ft)));
                }
            }

            tables
                .entry(mph)
                .or_default()
                .entry((group, key))
                .or_default()
                .insert(height_ft, cell);
        }

        Ok(SpacingTableStore { tables })
    }
}
