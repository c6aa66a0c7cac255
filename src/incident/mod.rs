//! Incident records, their closed-set attributes, and the create pipeline.

pub mod pipeline;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when text does not name a member of one of the closed sets.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Generates the string plumbing shared by every closed-set attribute:
/// `as_str`, `ALL`, case-insensitive `FromStr`, and `Display`.
macro_rules! closed_set {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Every member, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Wire names of every member, in declaration order.
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_ascii_lowercase();
                match lowered.as_str() {
                    $($text => Ok($ty::$variant),)+
                    _ => Err(UnknownVariant { kind: $kind, value: s.to_string() }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Workflow status of an incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

closed_set!(Status, "status", {
    Open => "open",
    InProgress => "in_progress",
    Resolved => "resolved",
    Closed => "closed",
});

/// Caller-assigned priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

closed_set!(Priority, "priority", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// Severity assigned by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

closed_set!(Severity, "severity", {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// Category assigned by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Network,
    #[default]
    Software,
    Hardware,
    Security,
}

closed_set!(Category, "category", {
    Network => "network",
    Software => "software",
    Hardware => "hardware",
    Security => "security",
});

/// A persisted incident, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub ai_severity: Severity,
    pub ai_category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate incident as submitted by a caller.
///
/// Every field is free text so that out-of-set values reach the validator
/// instead of failing deserialisation. Fields the server owns (`id`,
/// timestamps) are not part of the draft and are ignored when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub ai_severity: Option<String>,
    #[serde(default)]
    pub ai_category: Option<String>,
}

impl IncidentDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Look up a field's text by its wire name. Missing and empty are the same.
    pub fn field(&self, name: &str) -> &str {
        let value = match name {
            "title" => &self.title,
            "description" => &self.description,
            "status" => &self.status,
            "priority" => &self.priority,
            "ai_severity" => &self.ai_severity,
            "ai_category" => &self.ai_category,
            _ => return "",
        };
        value.as_deref().unwrap_or("")
    }
}

/// A fully defaulted and classified incident that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub ai_severity: Severity,
    pub ai_category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!(" Network ".parse::<Category>().unwrap(), Category::Network);
        assert_eq!("In_Progress".parse::<Status>().unwrap(), Status::InProgress);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err.kind, "priority");
        assert_eq!(err.to_string(), "'urgent' is not a valid priority");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Status::default(), Status::Open);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Severity::default(), Severity::Medium);
        assert_eq!(Category::default(), Category::Software);
    }

    #[test]
    fn test_names_match_serde() {
        for status in Status::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
        assert_eq!(Priority::NAMES.join(" "), "low medium high critical");
    }

    #[test]
    fn test_draft_ignores_server_owned_fields() {
        let draft: IncidentDraft = serde_json::from_str(
            r#"{"id": "abc", "title": "t", "description": "d", "created_at": "x"}"#,
        )
        .unwrap();
        assert_eq!(draft, IncidentDraft::new("t", "d"));
        assert_eq!(draft.field("status"), "");
    }
}
