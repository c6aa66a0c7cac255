//! Field validation for incident drafts.
//!
//! Constraints live in an explicit rule table rather than on the struct: each
//! field maps to an ordered list of rules, and the first rule a field breaks
//! produces its message. Optional fields are only checked when non-empty.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::{Category, IncidentDraft, Priority, Severity, Status};

/// A single constraint on a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    MinChars(usize),
    MaxChars(usize),
    OneOf(&'static [&'static str]),
}

impl Rule {
    fn check(self, field: &str, value: &str) -> Option<String> {
        match self {
            Rule::Required if value.is_empty() => Some(format!("{field} is required")),
            Rule::MinChars(n) if value.chars().count() < n => {
                Some(format!("{field} must be at least {n} characters"))
            }
            Rule::MaxChars(n) if value.chars().count() > n => {
                Some(format!("{field} must be at most {n} characters"))
            }
            Rule::OneOf(set) if !set.contains(&value) => {
                Some(format!("{field} must be one of: {}", set.join(" ")))
            }
            _ => None,
        }
    }
}

/// Rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub field: &'static str,
    /// Skip every rule when the value is empty.
    pub optional: bool,
    pub rules: Vec<Rule>,
}

/// Field name to message for every violated field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn insert(&mut self, field: &str, message: String) {
        self.0.insert(field.to_lowercase(), message);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.0.values() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks incident drafts against a rule table.
#[derive(Debug, Clone)]
pub struct Validator {
    table: Vec<FieldRules>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::for_incidents()
    }
}

impl Validator {
    pub fn new(table: Vec<FieldRules>) -> Self {
        Self { table }
    }

    /// The incident constraints: bounded required text plus closed sets.
    pub fn for_incidents() -> Self {
        Self::new(vec![
            FieldRules {
                field: "title",
                optional: false,
                rules: vec![Rule::Required, Rule::MinChars(1), Rule::MaxChars(200)],
            },
            FieldRules {
                field: "description",
                optional: false,
                rules: vec![Rule::Required, Rule::MinChars(1), Rule::MaxChars(1000)],
            },
            FieldRules {
                field: "status",
                optional: true,
                rules: vec![Rule::OneOf(Status::NAMES)],
            },
            FieldRules {
                field: "priority",
                optional: true,
                rules: vec![Rule::OneOf(Priority::NAMES)],
            },
            FieldRules {
                field: "ai_severity",
                optional: true,
                rules: vec![Rule::OneOf(Severity::NAMES)],
            },
            FieldRules {
                field: "ai_category",
                optional: true,
                rules: vec![Rule::OneOf(Category::NAMES)],
            },
        ])
    }

    pub fn validate(&self, draft: &IncidentDraft) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for entry in &self.table {
            let value = draft.field(entry.field);
            if entry.optional && value.is_empty() {
                continue;
            }
            if let Some(message) = entry.rules.iter().find_map(|r| r.check(entry.field, value)) {
                errors.insert(entry.field, message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(draft: IncidentDraft) -> Result<(), ValidationErrors> {
        Validator::for_incidents().validate(&draft)
    }

    #[test]
    fn test_valid_draft_passes() {
        let draft = IncidentDraft::new("Disk full", "Root volume at 100%")
            .with_status("in_progress")
            .with_priority("critical");
        assert!(validate(draft).is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let errors = validate(IncidentDraft::default()).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("title"), Some("title is required"));
        assert_eq!(errors.get("description"), Some("description is required"));
    }

    #[test]
    fn test_length_bounds_count_characters() {
        let errors = validate(IncidentDraft::new("x".repeat(201), "d")).unwrap_err();
        assert_eq!(errors.get("title"), Some("title must be at most 200 characters"));

        // 200 multi-byte characters are still within bounds.
        assert!(validate(IncidentDraft::new("é".repeat(200), "d")).is_ok());

        let errors = validate(IncidentDraft::new("t", "y".repeat(1001))).unwrap_err();
        assert_eq!(
            errors.get("description"),
            Some("description must be at most 1000 characters")
        );
    }

    #[test]
    fn test_closed_sets() {
        let mut draft = IncidentDraft::new("t", "d")
            .with_status("pending")
            .with_priority("urgent");
        draft.ai_severity = Some("critical".into());
        draft.ai_category = Some("database".into());

        let errors = validate(draft).unwrap_err();
        assert_eq!(
            errors.get("status"),
            Some("status must be one of: open in_progress resolved closed")
        );
        assert_eq!(
            errors.get("priority"),
            Some("priority must be one of: low medium high critical")
        );
        assert_eq!(
            errors.get("ai_severity"),
            Some("ai_severity must be one of: low medium high")
        );
        assert_eq!(
            errors.get("ai_category"),
            Some("ai_category must be one of: network software hardware security")
        );
    }

    #[test]
    fn test_empty_optional_fields_are_skipped() {
        let draft = IncidentDraft::new("t", "d").with_status("").with_priority("");
        assert!(validate(draft).is_ok());
    }

    #[test]
    fn test_custom_rule_table() {
        let validator = Validator::new(vec![FieldRules {
            field: "title",
            optional: false,
            rules: vec![Rule::MinChars(5)],
        }]);
        let errors = validator.validate(&IncidentDraft::new("abc", "")).unwrap_err();
        assert_eq!(errors.get("title"), Some("title must be at least 5 characters"));
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_errors_serialize_as_object() {
        let errors = validate(IncidentDraft::new("", "d")).unwrap_err();
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["title"], "title is required");
    }
}
