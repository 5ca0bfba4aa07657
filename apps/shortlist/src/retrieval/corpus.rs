use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::errors::PipelineError;
use crate::models::candidate::{normalize_batch, CandidateProfile};

/// The local candidate pool: loaded once per process, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    candidates: Vec<CandidateProfile>,
}

impl Corpus {
    pub fn new(candidates: Vec<CandidateProfile>) -> Self {
        Self { candidates }
    }

    /// Reads a JSON array of candidate records and normalizes it.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path.display(), e))?;
        let corpus = Self::from_json(&raw)?;
        info!(
            "Loaded {} candidates from {}",
            corpus.len(),
            path.display()
        );
        Ok(corpus)
    }

    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        let records: Vec<Value> = serde_json::from_str(raw)?;
        Ok(Self::new(normalize_batch(&records)))
    }

    pub fn candidates(&self) -> &[CandidateProfile] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_json_normalizes_records() {
        let corpus = Corpus::from_json(
            r#"[{"_id": "a", "rerankSummary": "rust"}, {"name": "no id"}, {"_id": "b"}]"#,
        )
        .unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.candidates()[0].rerank_summary, "rust");
        assert_eq!(corpus.candidates()[1].id, "b");
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(matches!(
            Corpus::from_json(r#"{"_id": "a"}"#),
            Err(PipelineError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"_id": "x", "summary": "hello"}}]"#).unwrap();
        let corpus = Corpus::load(file.path()).unwrap();
        assert_eq!(corpus.candidates()[0].id, "x");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Corpus::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
