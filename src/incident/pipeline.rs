//! Incident creation: validate, default, classify, persist.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::validate::{ValidationErrors, Validator};
use super::{Incident, IncidentDraft, NewIncident, Priority, Status};
use crate::classify::{Classification, Classifier};
use crate::storage::{IncidentStore, StoreError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Orchestrates incident creation and retrieval.
#[derive(Clone)]
pub struct IncidentPipeline {
    validator: Validator,
    classifier: Classifier,
    store: Arc<dyn IncidentStore>,
}

impl IncidentPipeline {
    pub fn new(
        validator: Validator,
        classifier: Classifier,
        store: Arc<dyn IncidentStore>,
    ) -> Self {
        Self {
            validator,
            classifier,
            store,
        }
    }

    /// Create an incident from a caller-supplied draft.
    ///
    /// Classification never blocks creation: on failure the incident gets
    /// `(medium, software)`. Caller-supplied `ai_*` values are always
    /// replaced.
    pub async fn create_incident(&self, draft: IncidentDraft) -> Result<Incident, PipelineError> {
        self.validator
            .validate(&draft)
            .map_err(PipelineError::Validation)?;

        // Validated above, so unparseable here means empty.
        let status: Status = draft.field("status").parse().unwrap_or_default();
        let priority: Priority = draft.field("priority").parse().unwrap_or_default();
        let title = draft.title.unwrap_or_default();
        let description = draft.description.unwrap_or_default();

        let classification = self.classify(&title, &description).await;

        let record = NewIncident {
            title,
            description,
            status,
            priority,
            ai_severity: classification.severity,
            ai_category: classification.category,
        };
        let store = Arc::clone(&self.store);
        let incident = tokio::task::spawn_blocking(move || store.create(record))
            .await
            .map_err(StoreError::from)??;

        info!(
            id = %incident.id,
            severity = %incident.ai_severity,
            category = %incident.ai_category,
            "incident created"
        );
        Ok(incident)
    }

    /// Every stored incident, in store order.
    pub async fn get_all_incidents(&self) -> Result<Vec<Incident>, StoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.list_all()).await?
    }

    /// Classify, substituting the defaults when the classifier fails.
    async fn classify(&self, title: &str, description: &str) -> Classification {
        match self.classifier.classify(title, description).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(error = %e, "AI analysis failed, using default classification");
                Classification::default()
            }
        }
    }
}
