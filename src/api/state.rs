use std::sync::Arc;

use crate::incident::pipeline::IncidentPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IncidentPipeline>,
}

impl AppState {
    pub fn new(pipeline: IncidentPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
