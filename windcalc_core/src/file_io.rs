//! # File I/O Module
//!
//! JSON documents in and out of the engine:
//! - **Inputs**: estimate requests, projects, concrete takeoffs, settings
//! - **Outputs**: any serializable result, written atomically
//!   (write to `.tmp`, sync, rename)
//! - **Version validation**: project files must match the schema major version
//!
//! Spacing tables are CSV and live in [`crate::tables::loader`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use windcalc_core::file_io::{load_project, save_json};
//! use std::path::Path;
//!
//! let project = load_project(Path::new("site.json")).unwrap();
//! save_json(&project, Path::new("site-copy.json")).unwrap();
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::calculations::concrete::ConcreteInput;
use crate::calculations::estimate::EstimateInput;
use crate::errors::{CalcError, CalcResult};
use crate::project::{FenceProject, SCHEMA_VERSION};
use crate::settings::Settings;

/// Read and parse a JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Write a value as pretty JSON with an atomic rename.
///
/// # Example
///
/// ```rust,no_run
/// use windcalc_core::file_io::save_json;
/// use windcalc_core::settings::Settings;
/// use std::path::Path;
///
/// save_json(&Settings::default(), Path::new("windcalc.json"))?;
/// # Ok::<(), windcalc_core::errors::CalcError>(())
/// ```
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value)?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a fence project.
///
/// # Returns
///
/// * `Ok(FenceProject)` - Parsed and version-checked
/// * `Err(CalcError::InvalidInput)` - Incompatible schema version
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_project(path: &Path) -> CalcResult<FenceProject> {
    let project: FenceProject = read_json(path)?;
    validate_version(&project.version)?;
    Ok(project)
}

/// Load a single estimate request.
pub fn load_estimate_input(path: &Path) -> CalcResult<EstimateInput> {
    read_json(path)
}

/// Load a concrete takeoff request.
pub fn load_concrete_input(path: &Path) -> CalcResult<ConcreteInput> {
    read_json(path)
}

/// Load settings; missing fields take their defaults.
pub fn load_settings(path: &Path) -> CalcResult<Settings> {
    let settings: Settings = read_json(path)?;
    settings.validate()?;
    Ok(settings)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || {
        CalcError::invalid_input(
            "version",
            file_version,
            format!("Unsupported project schema version (expected {})", SCHEMA_VERSION),
        )
    };

    match (file_parts.first(), current_parts.first()) {
        (Some(file_major), Some(current_major)) if file_major == current_major => {}
        _ => return Err(mismatch()),
    }

    // For 0.x versions a newer minor may carry breaking changes
    if current_parts[0] == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::Exposure;
    use crate::project::FenceSegment;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_project() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.json");

        let mut project = FenceProject::new("Site", 115.0, Exposure::C);
        project.add_segment(FenceSegment::new("North", 100.0, 6.0, 10.0));
        save_json(&project, &path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded, project);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_settings_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("windcalc.json");

        fs::write(&path, r#"{"strict_footing": true}"#).unwrap();
        assert!(load_settings(&path).unwrap().strict_footing);

        fs::write(&path, r#"{"risk": {"green_margin": -1}}"#).unwrap();
        assert_eq!(load_settings(&path).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_load_inputs() {
        let dir = TempDir::new().unwrap();
        let estimate = dir.path().join("estimate.json");
        let concrete = dir.path().join("concrete.json");

        fs::write(&estimate, r#"{"wind_speed_mph": 115, "height_total_ft": 8, "post_spacing_ft": 10, "exposure": "B"}"#)
            .unwrap();
        fs::write(&concrete, r#"{"hole_specs": [{"hole_diameter_in": 10, "hole_depth_in": 24, "hole_count": 4}]}"#)
            .unwrap();

        assert_eq!(load_estimate_input(&estimate).unwrap().exposure, Exposure::B);
        assert_eq!(load_concrete_input(&concrete).unwrap().hole_specs.len(), 1);
    }

    #[test]
    fn test_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(load_project(&missing).unwrap_err().error_code(), "FILE_ERROR");

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert_eq!(load_project(&bad).unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }
}
