use std::sync::Arc;

use crate::application::ports::{TempFileStore, UploadSource};
use crate::domain::{PipelineStage, Transcript};

use super::{
    ConversionError, ConversionOrchestrator, IngestError, MultipartIngestor, TempFileScope,
    TranscriptionClient, TranscriptionClientError,
};

/// Runs one upload through ingest → convert → transcribe.
///
/// Each call gets its own `TempFileScope`; everything allocated during the
/// run is released before `run` returns, whatever the outcome.
pub struct TranscriptionPipeline {
    store: Arc<dyn TempFileStore>,
    ingestor: MultipartIngestor,
    orchestrator: ConversionOrchestrator,
    client: TranscriptionClient,
}

impl TranscriptionPipeline {
    pub fn new(
        store: Arc<dyn TempFileStore>,
        ingestor: MultipartIngestor,
        orchestrator: ConversionOrchestrator,
        client: TranscriptionClient,
    ) -> Self {
        Self {
            store,
            ingestor,
            orchestrator,
            client,
        }
    }

    pub async fn run<U>(&self, source: &mut U) -> Result<Transcript, PipelineError>
    where
        U: UploadSource + ?Sized,
    {
        let mut scope = TempFileScope::new(Arc::clone(&self.store));
        let mut stage = PipelineStage::Receiving;
        tracing::debug!(stage = %stage, "Pipeline started");

        let result = self.run_stages(source, &mut scope, &mut stage).await;

        if !scope.allocated().is_empty() {
            tracing::debug!(
                outstanding = scope.allocated().len(),
                "Releasing temp files left by aborted stage"
            );
        }
        scope.release_all().await;

        match &result {
            Ok(transcript) => {
                tracing::info!(
                    stage = %stage,
                    segments = transcript.segments().len(),
                    "Pipeline completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    failed_stage = %stage,
                    stage = %PipelineStage::Failed,
                    error = %e,
                    "Pipeline aborted"
                );
            }
        }

        result
    }

    async fn run_stages<U>(
        &self,
        source: &mut U,
        scope: &mut TempFileScope,
        stage: &mut PipelineStage,
    ) -> Result<Transcript, PipelineError>
    where
        U: UploadSource + ?Sized,
    {
        let uploaded = self.ingestor.ingest(source, scope).await?;

        advance(stage, PipelineStage::Converting);
        let converted = self.orchestrator.convert(&uploaded, scope).await;
        scope.release(&uploaded.handle).await;
        let converted = converted?;

        advance(stage, PipelineStage::Transcribing);
        let transcript = self.client.transcribe(&converted, scope).await;
        scope.release(&converted.handle).await;
        let transcript = transcript?;

        advance(stage, PipelineStage::Responding);
        Ok(transcript)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    tracing::debug!(from = %stage, to = %next, "Pipeline stage transition");
    *stage = next;
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("upload incomplete: {0}")]
    IngestIncomplete(String),
    #[error("upload to conversion service failed: {0}")]
    UploadFailed(String),
    #[error("conversion failed: {reason}")]
    ConversionFailed {
        task: Option<String>,
        reason: String,
    },
    #[error("converted file download failed: {0}")]
    DownloadFailed(String),
    #[error("speech recognition failed: {0}")]
    RecognitionFailed(String),
    #[error("temp storage: {0}")]
    Storage(String),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MalformedRequest(_) => "MalformedRequest",
            PipelineError::IngestIncomplete(_) => "IngestIncomplete",
            PipelineError::UploadFailed(_) => "UploadFailed",
            PipelineError::ConversionFailed { .. } => "ConversionFailed",
            PipelineError::DownloadFailed(_) => "DownloadFailed",
            PipelineError::RecognitionFailed(_) => "RecognitionFailed",
            PipelineError::Storage(_) => "Storage",
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::NoFile | IngestError::MultipleFiles | IngestError::Malformed(_) => {
                PipelineError::MalformedRequest(e.to_string())
            }
            IngestError::Incomplete(_) => PipelineError::IngestIncomplete(e.to_string()),
            IngestError::Storage(inner) => PipelineError::Storage(inner.to_string()),
        }
    }
}

impl From<ConversionError> for PipelineError {
    fn from(e: ConversionError) -> Self {
        match e {
            ConversionError::Upload(inner) => PipelineError::UploadFailed(inner.to_string()),
            ConversionError::TaskFailed { ref task, .. } => PipelineError::ConversionFailed {
                task: Some(task.clone()),
                reason: e.to_string(),
            },
            ConversionError::Download(inner) => PipelineError::DownloadFailed(inner.to_string()),
            ConversionError::Storage(inner) => PipelineError::Storage(inner.to_string()),
            ConversionError::Submit(_)
            | ConversionError::MissingUploadForm
            | ConversionError::Wait(_)
            | ConversionError::TimedOut(_)
            | ConversionError::MissingOutput => PipelineError::ConversionFailed {
                task: None,
                reason: e.to_string(),
            },
        }
    }
}

impl From<TranscriptionClientError> for PipelineError {
    fn from(e: TranscriptionClientError) -> Self {
        match e {
            TranscriptionClientError::Storage(inner) => PipelineError::Storage(inner.to_string()),
            TranscriptionClientError::Recognition(inner) => {
                PipelineError::RecognitionFailed(inner.to_string())
            }
        }
    }
}
