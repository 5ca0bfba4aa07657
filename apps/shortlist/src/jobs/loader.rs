//! Job-config loading: YAML files in, `JobSpec` or a skip signal out.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::{PipelineError, SkipReason};
use crate::models::candidate::{normalize_profile, CandidateProfile};
use crate::models::job::JobSpec;

const CONFIG_EXTENSION: &str = "yml";

/// Result of loading one config file. A skip is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum JobLoad {
    Ready(JobSpec),
    Skipped(SkipReason),
}

/// Every `*.yml` file in `dir`, sorted by file name.
pub fn list_configs(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::io(dir.display(), e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::io(dir.display(), e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == CONFIG_EXTENSION) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Loads one config file. A missing file counts as empty input.
///
/// With `force_empty`, empty content becomes a job titled after the file with
/// no description instead of a skip.
pub fn load_job_config(path: &Path, force_empty: bool) -> Result<JobLoad, PipelineError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(PipelineError::io(path.display(), e)),
    };

    if raw.trim().is_empty() && force_empty {
        return Ok(JobLoad::Ready(JobSpec::new(config_name(path), "")));
    }

    let load = parse_job_config(&raw);
    if let JobLoad::Skipped(reason) = &load {
        warn!("Config at {} skipped: {reason}", path.display());
    }
    Ok(load)
}

/// Parses YAML config content. Empty content and documents without a usable
/// `title` are skips.
pub fn parse_job_config(raw: &str) -> JobLoad {
    if raw.trim().is_empty() {
        return JobLoad::Skipped(SkipReason::EmptyInput);
    }

    let document: serde_yaml::Value = match serde_yaml::from_str(raw) {
        Ok(document) => document,
        Err(e) => return JobLoad::Skipped(SkipReason::ConfigInvalid(e.to_string())),
    };
    if !document.is_mapping() {
        return JobLoad::Skipped(SkipReason::ConfigInvalid(
            "document is not a mapping".to_string(),
        ));
    }

    match serde_yaml::from_value::<JobSpec>(document) {
        Ok(job) if job.title.trim().is_empty() => {
            JobLoad::Skipped(SkipReason::ConfigInvalid("missing title".to_string()))
        }
        Ok(job) => JobLoad::Ready(job),
        Err(e) => JobLoad::Skipped(SkipReason::ConfigInvalid(e.to_string())),
    }
}

/// Reads one candidate record (JSON) for a query run and applies the profile
/// defaults. A record without an id is kept under the placeholder id.
pub fn load_profile(path: &Path) -> Result<CandidateProfile, PipelineError> {
    let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path.display(), e))?;
    let record: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(normalize_profile(&record))
}

/// The file name used as the config identifier in outputs and submissions.
pub fn config_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
