//! Severity labels carried by review bot comments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity classification extracted from a review comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Severity {
    /// All severities, in keyword matching order.
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Major, Severity::Minor];

    /// The label as it appears in comment text and in stored records.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Major => "Major",
            Severity::Minor => "Minor",
        }
    }

    /// First severity whose label occurs in `text`.
    pub fn detect(text: &str) -> Option<Severity> {
        Self::ALL.into_iter().find(|s| text.contains(s.label()))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sev| sev.label() == s)
            .ok_or_else(|| format!("unknown severity: {}", s))
    }
}
