//! Filesystem boundary for the CLI.
//!
//! The engine itself never touches disk. This module reads raw source rows
//! and writes reports:
//! - JSONL source rows (one JSON object per line)
//! - Normalized record exports
//! - Pretty JSON reports

pub mod jsonl;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::models::RawRecord;
use jsonl::JsonlReader;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Read every raw row from a JSONL source file.
///
/// Unlike [`JsonlReader::read_all`], a missing file is an error here: there is
/// nothing to compute without input.
pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>, StorageError> {
    let reader: JsonlReader<RawRecord> = JsonlReader::new(path.to_path_buf());
    if !reader.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let rows = reader.read_all()?;
    info!("Loaded {} raw rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Write a value as pretty JSON to `out`, or to stdout when `out` is `None`.
pub fn write_report<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value)?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("{}\n", json))?;
            info!("Wrote report to {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_raw_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("matches.jsonl");
        fs::write(
            &path,
            r#"{"PlayerName":"Ana","HeroName":"Valla","Winner":"Yes"}
{"PlayerName":"Bo","HeroName":"Muradin","HeroDamage":"12000"}
"#,
        )
        .unwrap();

        let rows = load_raw_records(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("HeroName"), "Valla");
        assert_eq!(rows[1].text("HeroDamage"), "12000");
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.jsonl");

        let err = load_raw_records(&path).unwrap_err();
        assert!(matches!(err, StorageError::PathNotFound(p) if p == path));
    }

    #[test]
    fn test_write_report_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("summary.json");

        write_report(&serde_json::json!({"matches": 3}), Some(&path)).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["matches"], 3);
    }
}
