use axum::Json;
use axum::extract::State;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::multipart_source::MultipartUploadSource;
use crate::application::services::PipelineError;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e.body_text(), "Rejected non-multipart transcription request");
            return error_response(&PipelineError::MalformedRequest(e.body_text()));
        }
    };

    let mut source = MultipartUploadSource::new(multipart);

    match state.pipeline.run(&mut source).await {
        Ok(transcript) => {
            let transcript = transcript.text();
            tracing::info!(chars = transcript.len(), "Transcription request completed");
            (StatusCode::OK, Json(TranscriptResponse { transcript })).into_response()
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "Transcription request failed");
            error_response(&e)
        }
    }
}

pub fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::MalformedRequest(_) | PipelineError::IngestIncomplete(_) => {
            StatusCode::BAD_REQUEST
        }
        PipelineError::UploadFailed(_)
        | PipelineError::ConversionFailed { .. }
        | PipelineError::DownloadFailed(_)
        | PipelineError::RecognitionFailed(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Caller-facing text. Fixed per kind so paths, URLs and upstream bodies
/// stay in the logs.
pub fn public_message(error: &PipelineError) -> String {
    match error {
        PipelineError::MalformedRequest(_) => {
            "Request must be multipart/form-data carrying exactly one file".to_string()
        }
        PipelineError::IngestIncomplete(_) => {
            "Upload ended before the file was fully received".to_string()
        }
        PipelineError::UploadFailed(_) => {
            "The conversion service rejected the uploaded file".to_string()
        }
        PipelineError::ConversionFailed {
            task: Some(task), ..
        } => format!("Audio conversion failed at task {}", task),
        PipelineError::ConversionFailed { task: None, .. } => "Audio conversion failed".to_string(),
        PipelineError::DownloadFailed(_) => "Converted audio could not be retrieved".to_string(),
        PipelineError::RecognitionFailed(_) => "Speech recognition failed".to_string(),
        PipelineError::Storage(_) => "Temporary storage error".to_string(),
    }
}

fn error_response(error: &PipelineError) -> Response {
    (
        status_for(error),
        Json(ErrorResponse {
            error: error.kind().to_string(),
            message: public_message(error),
        }),
    )
        .into_response()
}
