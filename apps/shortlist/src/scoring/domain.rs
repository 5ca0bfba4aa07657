//! Domain Classifier: assigns a coarse job category from title + description.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Legal,
    Data,
    Engineering,
    General,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Legal => "legal",
            Domain::Data => "data",
            Domain::Engineering => "engineering",
            Domain::General => "general",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static LEGAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(lawyer|law|legal|jd|attorney|counsel|m&a|merger|acquisitions|corporate)\b",
    )
    .unwrap()
});

static DATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(data scientist|data science|machine learning|ml|statistics|deep learning|nlp)\b",
    )
    .unwrap()
});

static ENGINEERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(engineer|developer|javascript|node|backend|frontend|api|microservice|devops)\b",
    )
    .unwrap()
});

/// Priority order: legal, then data, then engineering. First hit wins.
static RULES: Lazy<[(&'static Regex, Domain); 3]> = Lazy::new(|| {
    [
        (&*LEGAL, Domain::Legal),
        (&*DATA, Domain::Data),
        (&*ENGINEERING, Domain::Engineering),
    ]
});

/// Classifies raw (un-normalized) job text. Total and pure.
pub fn classify(text: &str) -> Domain {
    if text.trim().is_empty() {
        return Domain::General;
    }
    RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, domain)| *domain)
        .unwrap_or(Domain::General)
}
