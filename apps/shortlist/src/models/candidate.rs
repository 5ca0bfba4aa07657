//! Candidate profiles and the Profile Normalizer.
//!
//! Loosely-shaped records (local corpus rows, remote vector-search hits, profile
//! files) are coerced into `CandidateProfile` exactly once, here. Downstream code
//! never re-checks the defaults.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::job::scalar_to_string;

pub const UNKNOWN_ID: &str = "unknown";
const UNNAMED: &str = "Unnamed";

/// Keys a record may carry its identifier under, in precedence order.
const ID_KEYS: [&str; 3] = ["id", "_id", "_id_str"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub id: String,
    pub name: String,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub summary: String,
    pub rerank_summary: String,
}

impl CandidateProfile {
    /// Summary, rerank summary, experience and education joined for matching.
    pub fn profile_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.summary,
            self.rerank_summary,
            self.experience.join(" "),
            self.education.join(" ")
        )
    }
}

/// Coerces one raw record into a canonical profile, applying every default.
pub fn normalize_profile(record: &Value) -> CandidateProfile {
    let fields = record_fields(record);
    let id = extract_id(fields).unwrap_or_else(|| UNKNOWN_ID.to_string());
    build_profile(id, fields)
}

/// Normalizes a batch, dropping records without an identifier and keeping the
/// first occurrence of each duplicate identifier.
pub fn normalize_batch(records: &[Value]) -> Vec<CandidateProfile> {
    let mut seen = HashSet::new();
    let mut profiles = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let fields = record_fields(record);
        let Some(id) = extract_id(fields) else {
            warn!("Dropping candidate record #{index}: no identifier");
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!("Dropping duplicate candidate id '{id}' (record #{index})");
            continue;
        }
        profiles.push(build_profile(id, fields));
    }

    profiles
}

fn build_profile(id: String, fields: Option<&Map<String, Value>>) -> CandidateProfile {
    let name = text_field(fields, &["name"]).unwrap_or_else(|| UNNAMED.to_string());
    let summary =
        text_field(fields, &["summary"]).unwrap_or_else(|| format!("{name} - no summary provided"));
    let rerank_summary =
        text_field(fields, &["rerankSummary", "rerank_summary"]).unwrap_or_else(|| summary.clone());

    CandidateProfile {
        id,
        name,
        experience: list_field(fields, "experience"),
        education: list_field(fields, "education"),
        summary,
        rerank_summary,
    }
}

fn record_fields(record: &Value) -> Option<&Map<String, Value>> {
    record.as_object()
}

/// Top-level key first, then the `attributes` object some vector-search hits
/// nest their payload under.
fn lookup<'a>(fields: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    let fields = fields?;
    fields.get(key).filter(|v| !v.is_null()).or_else(|| {
        fields
            .get("attributes")
            .and_then(Value::as_object)
            .and_then(|attrs| attrs.get(key))
            .filter(|v| !v.is_null())
    })
}

fn extract_id(fields: Option<&Map<String, Value>>) -> Option<String> {
    ID_KEYS
        .iter()
        .filter_map(|key| lookup(fields, key))
        .filter_map(scalar_to_string)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

fn text_field(fields: Option<&Map<String, Value>>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(fields, key))
        .filter_map(scalar_to_string)
        .find(|s| !s.is_empty())
}

/// Arrays of strings pass through; object entries flatten to their string values.
/// Anything that is not an array becomes an empty list.
fn list_field(fields: Option<&Map<String, Value>>, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = lookup(fields, key) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => {
                let joined = obj
                    .values()
                    .filter_map(scalar_to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                (!joined.is_empty()).then_some(joined)
            }
            other => scalar_to_string(other),
        })
        .collect()
}
