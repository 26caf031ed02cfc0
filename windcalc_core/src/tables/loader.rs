//! CSV loading for spacing tables.
//!
//! One file per wind speed, named `<speed>mph.csv` (e.g. `115mph.csv`):
//!
//! ```text
//! group,label,4,6,8,10,12
//! IC_PIPE,"1 7/8""",10,9,N/A,N/A,N/A
//! IC_PIPE,"2 3/8""",10,10,8.5,7,
//! II_CSHAPE,"1 7/8"" x 1 5/8"" x .105",10,8,6,-,-
//! ```
//!
//! A number is a maximum spacing in feet. `N/A`, `NA`, `-` and `—` mark the
//! post as not applicable at that height. A blank cell means the row has no
//! column for that height, so the selector falls back to the formula.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::{CalcError, CalcResult};
use crate::materials::PostGroup;
use crate::tables::{SpacingCell, SpacingTableBuilder, SpacingTableStore};

const NOT_APPLICABLE_MARKERS: [&str; 4] = ["N/A", "NA", "-", "—"];

/// Load a single `<speed>mph.csv` file.
pub fn load_file(path: &Path) -> CalcResult<SpacingTableStore> {
    read_table(path)?.build()
}

/// Load every `<speed>mph.csv` file in a directory.
///
/// Other files are ignored. Files are read in name order so a rebuilt store
/// is always identical.
pub fn load_dir(dir: &Path) -> CalcResult<SpacingTableStore> {
    let entries = fs::read_dir(dir)
        .map_err(|e| CalcError::file_error("read directory", dir.display().to_string(), e.to_string()))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| CalcError::file_error("read directory", dir.display().to_string(), e.to_string()))?;
        let path = entry.path();
        if path.is_file() && wind_speed_from_path(&path).is_some() {
            paths.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-table file");
        }
    }
    paths.sort();

    let mut builder = SpacingTableBuilder::default();
    for path in &paths {
        builder = builder.merge(read_table(path)?);
    }

    let store = builder.build()?;
    info!(
        dir = %dir.display(),
        tables = store.len(),
        wind_speeds = ?store.wind_speeds(),
        "loaded spacing tables"
    );
    Ok(store)
}

/// Wind speed encoded in a table file name
pub fn wind_speed_from_path(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    let stem = name.strip_suffix("mph.csv")?;
    stem.parse::<u32>().ok().filter(|mph| *mph > 0)
}

fn read_table(path: &Path) -> CalcResult<SpacingTableBuilder> {
    let shown = path.display().to_string();
    let mph = wind_speed_from_path(path)
        .ok_or_else(|| CalcError::table(&shown, "File name must look like '<speed>mph.csv'"))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| CalcError::file_error("open", &shown, e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| CalcError::table(&shown, format!("Unreadable header: {}", e)))?
        .clone();

    if headers.len() < 3
        || !headers.get(0).is_some_and(|h| h.eq_ignore_ascii_case("group"))
        || !headers.get(1).is_some_and(|h| h.eq_ignore_ascii_case("label"))
    {
        return Err(CalcError::table(&shown, "Header must be 'group,label,<height>,...'"));
    }

    let heights = headers
        .iter()
        .skip(2)
        .map(|h| parse_height(h).ok_or_else(|| CalcError::table(&shown, format!("Bad height column '{}'", h))))
        .collect::<CalcResult<Vec<f64>>>()?;

    let mut builder = SpacingTableBuilder::default();
    let mut rows = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| CalcError::table(&shown, e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let at = |reason: String| CalcError::table(&shown, format!("line {}: {}", line, reason));

        if record.iter().all(str::is_empty) {
            continue;
        }

        let group_code = record.get(0).unwrap_or_default();
        let group = PostGroup::from_code(group_code).ok_or_else(|| at(format!("Unknown post group '{}'", group_code)))?;
        let label = record.get(1).unwrap_or_default();
        if label.is_empty() {
            return Err(at("Missing post label".to_string()));
        }

        for (height_ft, raw) in heights.iter().zip(record.iter().skip(2)) {
            if let Some(cell) = parse_cell(raw).map_err(&at)? {
                builder.push(mph, group, label, *height_ft, cell);
            }
        }
        rows += 1;
    }

    debug!(path = %shown, wind_speed_mph = mph, rows, "read spacing table");
    Ok(builder)
}

fn parse_height(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_end_matches(['\'', '"']);
    let trimmed = trimmed.strip_suffix("ft").unwrap_or(trimmed).trim();
    trimmed.parse::<f64>().ok().filter(|h| h.is_finite() && *h > 0.0)
}

fn parse_cell(raw: &str) -> Result<Option<SpacingCell>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if NOT_APPLICABLE_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(raw)) {
        return Ok(Some(SpacingCell::NotApplicable));
    }
    match raw.parse::<f64>() {
        Ok(ft) if ft.is_finite() && ft > 0.0 => Ok(Some(SpacingCell::Spacing(ft))),
        _ => Err(format!("Bad spacing value '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{LookupGap, LookupOutcome};
    use std::io::Write;
    use tempfile::TempDir;

    const TABLE_115: &str = "group,label,6,8,10\n\
        IC_PIPE,\"2 3/8\"\"\",10,8.5,\n\
        IC_PIPE,\"1 7/8\"\"\",9,n/a,—\n\
        c-shape,\"1 7/8\"\" x 1 5/8\"\" x .105\",8,-,NA\n";

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_file_name_parsing() {
        assert_eq!(wind_speed_from_path(Path::new("tables/115mph.csv")), Some(115));
        assert_eq!(wind_speed_from_path(Path::new("130MPH.csv")), Some(130));
        assert_eq!(wind_speed_from_path(Path::new("notes.csv")), None);
        assert_eq!(wind_speed_from_path(Path::new("0mph.csv")), None);
    }

    #[test]
    fn test_cells_numeric_na_blank() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "115mph.csv", TABLE_115);
        let store = load_file(&path).unwrap();

        assert_eq!(store.lookup(115.0, PostGroup::Pipe, "2 3/8\"", 8.0), LookupOutcome::Spacing(8.5));
        assert_eq!(
            store.lookup(115.0, PostGroup::Pipe, "2 3/8\"", 10.0),
            LookupOutcome::NoEntry(LookupGap::NoHeightColumn)
        );
        assert_eq!(store.lookup(115.0, PostGroup::Pipe, "1 7/8\"", 8.0), LookupOutcome::NotApplicable);
        assert_eq!(store.lookup(115.0, PostGroup::Pipe, "1 7/8\"", 10.0), LookupOutcome::NotApplicable);
        assert_eq!(
            store.lookup(115.0, PostGroup::CShape, "1 7/8\" x 1 5/8\" x .105", 8.0),
            LookupOutcome::NotApplicable
        );
    }

    #[test]
    fn test_load_dir_skips_other_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "115mph.csv", TABLE_115);
        write(dir.path(), "130mph.csv", "group,label,8\npipe,\"4\"\"\",12\n");
        write(dir.path(), "README.txt", "not a table");

        let store = load_dir(dir.path()).unwrap();
        assert_eq!(store.wind_speeds(), vec![115, 130]);
        assert_eq!(store.lookup(130.0, PostGroup::Pipe, "4\"", 8.0), LookupOutcome::Spacing(12.0));
    }

    #[test]
    fn test_bad_header() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "115mph.csv", "post,size,8\npipe,x,5\n");
        let err = load_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "TABLE_ERROR");
    }

    #[test]
    fn test_bad_number_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "115mph.csv", "group,label,8\npipe,a,5\npipe,b,lots\n");
        match load_file(&path).unwrap_err() {
            CalcError::TableError { reason, .. } => assert!(reason.contains("line 3"), "{}", reason),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_group() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "115mph.csv", "group,label,8\nwood,4x4,5\n");
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_missing_dir() {
        let err = load_dir(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
