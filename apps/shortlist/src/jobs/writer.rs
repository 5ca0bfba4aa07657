use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::PipelineError;
use crate::models::results::{JobRanking, RankedCandidate};

/// On-disk record of one job's ranking, `<output_dir>/<config>.json`.
#[derive(Debug, Serialize)]
pub struct SubmissionRecord<'a> {
    pub config: &'a str,
    pub object_ids: &'a [String],
    pub candidates: &'a [RankedCandidate],
    pub generated_at: DateTime<Utc>,
}

impl<'a> SubmissionRecord<'a> {
    pub fn new(config: &'a str, ranking: &'a JobRanking) -> Self {
        Self {
            config,
            object_ids: &ranking.object_ids,
            candidates: &ranking.candidates,
            generated_at: Utc::now(),
        }
    }
}

pub fn write_submission(
    output_dir: &Path,
    record: &SubmissionRecord<'_>,
) -> Result<PathBuf, PipelineError> {
    let path = output_dir.join(format!("{}.json", record.config));
    write_pretty(&path, record)?;
    Ok(path)
}

/// Stores the evaluation endpoint's reply next to the submission.
pub fn write_response(
    output_dir: &Path,
    config: &str,
    response: &Value,
) -> Result<PathBuf, PipelineError> {
    let path = output_dir.join(format!("{config}.response.json"));
    write_pretty(&path, response)?;
    Ok(path)
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent.display(), e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| PipelineError::io(path.display(), e))
}
