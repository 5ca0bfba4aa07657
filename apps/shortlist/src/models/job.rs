use serde::{Deserialize, Deserializer, Serialize};

/// A job loaded from a config document. Read-only for the whole run.
///
/// Deserialization never rejects a loosely-typed field; whether a missing
/// title makes the config unusable is the loader's call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub hard_criteria: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub soft_criteria: Vec<String>,
}

impl JobSpec {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// `title description`, the raw text used for domain detection and rerank keywords.
    pub fn headline(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Title, description and both criteria lists, space-joined, un-normalized.
    pub fn criteria_text(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if !self.title.is_empty() {
            parts.push(self.title.clone());
        }
        if !self.description.is_empty() {
            parts.push(self.description.clone());
        }
        parts.push(self.hard_criteria.join(" "));
        parts.push(self.soft_criteria.join(" "));
        parts.join(" ")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string).unwrap_or_default())
}

/// Accepts a list of scalars, a single scalar, or null.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => {
            items.iter().filter_map(scalar_to_string).collect()
        }
        Some(other) => scalar_to_string(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

pub(crate) fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
