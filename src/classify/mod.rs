//! AI-assisted severity/category classification.
//!
//! The classifier asks a text-completion endpoint for a JSON verdict and
//! falls back to a keyword scan when the reply is not JSON. Whatever comes
//! back is coerced into the closed sets, so callers always receive a valid
//! [`Classification`]. With no endpoint configured the classifier runs in
//! static-default mode and never leaves the process.

pub mod openai;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::incident::{Category, Severity};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion endpoint returned no content")]
    EmptyResponse,
}

/// A text-completion backend.
#[async_trait::async_trait]
pub trait Completion: Send + Sync {
    /// Send one prompt and return the raw text of the first choice.
    async fn complete(&self, prompt: &str) -> Result<String, ClassifyError>;
}

/// Severity and category for one incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    pub category: Category,
}

impl Classification {
    pub fn new(severity: Severity, category: Category) -> Self {
        Self { severity, category }
    }
}

#[derive(Clone, Default)]
pub struct Classifier {
    backend: Option<Arc<dyn Completion>>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("live", &self.is_live())
            .finish()
    }
}

impl Classifier {
    /// A classifier backed by `backend`.
    pub fn new(backend: Arc<dyn Completion>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A classifier that always answers `(medium, software)`.
    pub fn static_default() -> Self {
        Self { backend: None }
    }

    pub fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn classify(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Classification, ClassifyError> {
        let Some(backend) = &self.backend else {
            return Ok(Classification::default());
        };

        let reply = backend.complete(&build_prompt(title, description)).await?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(ClassifyError::EmptyResponse);
        }
        Ok(parse_response(reply))
    }
}

/// The instruction sent to the completion endpoint.
pub fn build_prompt(title: &str, description: &str) -> String {
    format!(
        r#"Analyze the following incident and determine:
1. Severity: Choose from "low", "medium", or "high"
2. Category: Choose from "network", "software", "hardware", or "security"

Consider these guidelines:
- Severity: Based on potential impact, urgency, and scope
- Category: Based on the type of issue described

Incident Title: {title}
Incident Description: {description}

Respond with a JSON object in this exact format:
{{
  "severity": "low|medium|high",
  "category": "network|software|hardware|security"
}}
"#
    )
}

#[derive(Debug, Default, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    severity: String,
    #[serde(default)]
    category: String,
}

/// Turn a completion reply into a classification.
///
/// Tries a JSON object first: the whole reply, then the outermost `{...}`
/// inside it if that names both an in-set severity and category. Otherwise
/// scans the text for keywords. Values outside the closed sets become the
/// defaults.
pub fn parse_response(text: &str) -> Classification {
    let raw = match parse_structured(text) {
        Some(raw) => raw,
        None => {
            debug!("completion reply is not JSON, scanning text");
            scan_text(text)
        }
    };

    Classification {
        severity: raw.severity.parse().unwrap_or_default(),
        category: raw.category.parse().unwrap_or_default(),
    }
}

fn parse_structured(text: &str) -> Option<RawVerdict> {
    let text = text.trim();
    if let Ok(raw) = serde_json::from_str(text) {
        return Some(raw);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    // An object buried in prose only counts when it carries a full verdict.
    let raw: RawVerdict = serde_json::from_str(&text[start..=end]).ok()?;
    let complete =
        raw.severity.parse::<Severity>().is_ok() && raw.category.parse::<Category>().is_ok();
    complete.then_some(raw)
}

/// Keyword scan. Checks are presence-based and run in a fixed priority order.
fn scan_text(text: &str) -> RawVerdict {
    let text = text.to_lowercase();
    let mut severity = Severity::Medium;
    let mut category = Category::Software;

    if text.contains("severity") {
        if text.contains("low") {
            severity = Severity::Low;
        } else if text.contains("high") {
            severity = Severity::High;
        }
    }

    let order: &[Category] = if text.contains("category") {
        &[Category::Network, Category::Hardware, Category::Security]
    } else {
        &[Category::Hardware, Category::Network, Category::Security]
    };
    if let Some(found) = order.iter().find(|c| text.contains(c.as_str())) {
        category = *found;
    }

    RawVerdict {
        severity: severity.as_str().to_string(),
        category: category.as_str().to_string(),
    }
}
