//! JSON snapshot of one run's listings.
//!
//! Every run writes its own `outdoor_jobs_<YYYYMMDD_HHMMSS>.json`; nothing
//! reads previous snapshots back during a run.

use crate::JobListing;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// File name for a snapshot taken at `at`.
pub fn snapshot_file_name(at: NaiveDateTime) -> String {
    format!("outdoor_jobs_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Writes `jobs` as pretty-printed JSON into `dir`, creating the directory if needed.
pub fn save_snapshot(
    dir: &Path,
    jobs: &[JobListing],
    at: NaiveDateTime,
) -> Result<PathBuf, SnapshotError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| SnapshotError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let json_output = serde_json::to_string_pretty(jobs)?;
    let output_path = dir.join(snapshot_file_name(at));

    fs::write(&output_path, json_output).map_err(|source| SnapshotError::Io {
        path: output_path.clone(),
        source,
    })?;

    info!(count = jobs.len(), path = %output_path.display(), "Saved jobs snapshot");
    Ok(output_path)
}

pub fn load_snapshot(path: &Path) -> Result<Vec<JobListing>, SnapshotError> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_jobs;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 42)
            .unwrap()
    }

    #[test]
    fn test_snapshot_file_name_format() {
        assert_eq!(
            snapshot_file_name(fixed_time()),
            "outdoor_jobs_20240307_090542.json"
        );
    }

    #[test]
    fn test_save_then_load_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut jobs = sample_jobs();
        jobs[1].date_posted = None;
        jobs[2].experience_level = Some("Entry".to_string());
        jobs[3].title = "Guía de naturaleza – Ñandú".to_string();

        let path = save_snapshot(dir.path(), &jobs, fixed_time()).unwrap();
        assert_eq!(path, dir.path().join("outdoor_jobs_20240307_090542.json"));

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, jobs);
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = sample_jobs().remove(0);
        job.date_posted = None;

        let path = save_snapshot(dir.path(), &[job], fixed_time()).unwrap();
        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"date_posted\": null"));
        assert!(raw.contains("\"experience_level\": null"));
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("runs");

        let path = save_snapshot(&nested, &[], fixed_time()).unwrap();
        assert!(path.exists());
        assert!(load_snapshot(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
