use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ConversionService, ConversionServiceError, TempStoreError};
use crate::domain::{ConversionProfile, ConversionRequest, ConvertedAudio, UploadedAudio};

use super::TempFileScope;

/// Drives one submit → upload → await → locate → download cycle against the
/// conversion service.
pub struct ConversionOrchestrator {
    service: Arc<dyn ConversionService>,
    profile: ConversionProfile,
    wait_timeout: Option<Duration>,
}

impl ConversionOrchestrator {
    pub fn new(
        service: Arc<dyn ConversionService>,
        profile: ConversionProfile,
        wait_timeout: Option<Duration>,
    ) -> Self {
        Self {
            service,
            profile,
            wait_timeout,
        }
    }

    pub fn profile(&self) -> &ConversionProfile {
        &self.profile
    }

    #[tracing::instrument(skip_all, fields(file = %uploaded.handle))]
    pub async fn convert(
        &self,
        uploaded: &UploadedAudio,
        scope: &mut TempFileScope,
    ) -> Result<ConvertedAudio, ConversionError> {
        let request = ConversionRequest::for_stem(&self.profile, &uploaded.stem);

        let job = self
            .service
            .create_job(&request)
            .await
            .map_err(ConversionError::Submit)?;
        tracing::info!(job_id = %job.id, tasks = job.tasks.len(), "Conversion job created");

        let form = job
            .import_form()
            .ok_or(ConversionError::MissingUploadForm)?;

        let (content, content_length) = scope.open(&uploaded.handle).await?;
        self.service
            .upload(form, uploaded.handle.file_name(), content, content_length)
            .await
            .map_err(ConversionError::Upload)?;
        tracing::debug!(job_id = %job.id, bytes = content_length, "Source file uploaded");

        let job = match self.wait_timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.wait_for_job(&job.id))
                .await
                .map_err(|_| ConversionError::TimedOut(limit))?,
            None => self.service.wait_for_job(&job.id).await,
        }
        .map_err(ConversionError::Wait)?;

        if let Some(task) = job.failed_task() {
            tracing::warn!(
                job_id = %job.id,
                task = %task.label(),
                message = ?task.message,
                "Conversion task failed"
            );
            return Err(ConversionError::TaskFailed {
                task: task.label().to_string(),
                message: task.message.clone().unwrap_or_default(),
            });
        }

        let output = job.export_file().ok_or(ConversionError::MissingOutput)?;
        tracing::debug!(job_id = %job.id, filename = %output.filename, "Conversion finished");

        let handle = scope.allocate(&output.filename).await?;
        let stream = self
            .service
            .download(&output.url)
            .await
            .map_err(ConversionError::Download)?;

        let size_bytes = scope.write(&handle, stream).await.map_err(|e| match e {
            TempStoreError::SourceFailed(io) => {
                ConversionError::Download(ConversionServiceError::DownloadFailed(io.to_string()))
            }
            other => ConversionError::Storage(other),
        })?;

        tracing::info!(
            job_id = %job.id,
            filename = %output.filename,
            bytes = size_bytes,
            "Converted file downloaded"
        );

        Ok(ConvertedAudio {
            handle,
            filename: output.filename.clone(),
            size_bytes,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("job submission: {0}")]
    Submit(ConversionServiceError),
    #[error("job has no import task with an upload form")]
    MissingUploadForm,
    #[error("upload: {0}")]
    Upload(ConversionServiceError),
    #[error("waiting for job: {0}")]
    Wait(ConversionServiceError),
    #[error("job did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("task {task} failed: {message}")]
    TaskFailed { task: String, message: String },
    #[error("job finished without an exported file")]
    MissingOutput,
    #[error("download: {0}")]
    Download(ConversionServiceError),
    #[error("temp storage: {0}")]
    Storage(#[from] TempStoreError),
}
