use std::sync::Arc;

use crate::application::services::TranscriptionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TranscriptionPipeline>,
    pub max_upload_bytes: usize,
}
