use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyVerdict {
    Safe,
    Unsafe,
    #[serde(rename = "needs-review", alias = "needs_review", alias = "ask_server")]
    NeedsReview,
    Error,
}

impl SafetyVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyVerdict::Safe => "safe",
            SafetyVerdict::Unsafe => "unsafe",
            SafetyVerdict::NeedsReview => "needs-review",
            SafetyVerdict::Error => "error",
        }
    }
}

impl fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub page: u32,
    #[serde(default)]
    pub bbox: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Outcome of one question. A failed call is folded into this same shape
/// with [`SafetyVerdict::Error`], so rendering never branches on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAnswer {
    pub result: SafetyVerdict,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl SafetyAnswer {
    pub fn from_failure(reason: impl fmt::Display) -> Self {
        Self {
            result: SafetyVerdict::Error,
            summary: format!("Error: {}", reason),
            reasons: Vec::new(),
            alternatives: Vec::new(),
            citations: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.result == SafetyVerdict::Error
    }
}
