use async_trait::async_trait;

use super::ByteStream;
use crate::domain::{ConversionJob, ConversionRequest, UploadForm};

/// Remote asynchronous file conversion: jobs made of dependent tasks.
#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn create_job(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionJob, ConversionServiceError>;

    /// Posts `content` to the import task's form, fields first.
    async fn upload(
        &self,
        form: &UploadForm,
        file_name: &str,
        content: ByteStream<'static>,
        content_length: u64,
    ) -> Result<(), ConversionServiceError>;

    /// Suspends until every task of the job is terminal.
    async fn wait_for_job(&self, job_id: &str) -> Result<ConversionJob, ConversionServiceError>;

    async fn download(&self, url: &str) -> Result<ByteStream<'static>, ConversionServiceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionServiceError {
    #[error("job creation failed: {0}")]
    JobCreationFailed(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("job wait failed: {0}")]
    WaitFailed(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
