use crate::application::ports::{TempStoreError, UploadSource, UploadSourceError};
use crate::domain::{UploadedAudio, filename_stem};

use super::TempFileScope;

/// Streams the single file part of an upload into a temp file.
pub struct MultipartIngestor {
    input_format: String,
}

impl MultipartIngestor {
    /// `input_format` becomes the extension of the staged file, matching what
    /// the conversion stage declares as its input.
    pub fn new(input_format: impl Into<String>) -> Self {
        Self {
            input_format: input_format.into(),
        }
    }

    /// Parts without a file name are skipped. A second file part is rejected;
    /// the first one is released before returning.
    pub async fn ingest<U>(
        &self,
        source: &mut U,
        scope: &mut TempFileScope,
    ) -> Result<UploadedAudio, IngestError>
    where
        U: UploadSource + ?Sized,
    {
        let uploaded = self.ingest_first_file(source, scope).await?;

        if let Err(e) = self.reject_extra_files(source).await {
            scope.release(&uploaded.handle).await;
            return Err(e);
        }

        Ok(uploaded)
    }

    async fn ingest_first_file<U>(
        &self,
        source: &mut U,
        scope: &mut TempFileScope,
    ) -> Result<UploadedAudio, IngestError>
    where
        U: UploadSource + ?Sized,
    {
        loop {
            let part = match source.next_part().await? {
                Some(part) => part,
                None => return Err(IngestError::NoFile),
            };

            let Some(original_filename) = part.file_name.clone() else {
                tracing::debug!(field = ?part.field_name, "Skipping non-file form field");
                continue;
            };

            let stem = filename_stem(&original_filename);
            let handle = scope
                .allocate(&format!("{}.{}", stem, self.input_format))
                .await?;

            tracing::debug!(
                filename = %original_filename,
                content_type = ?part.content_type,
                file = %handle,
                "Streaming upload to temp storage"
            );

            let content_type = part.content_type.clone();
            let size_bytes = match scope.write(&handle, part.body).await {
                Ok(n) => n,
                Err(e) => {
                    scope.release(&handle).await;
                    return Err(match e {
                        TempStoreError::SourceFailed(io) => IngestError::Incomplete(io.to_string()),
                        other => IngestError::Storage(other),
                    });
                }
            };

            tracing::info!(
                filename = %original_filename,
                bytes = size_bytes,
                "Upload written to temp storage"
            );

            return Ok(UploadedAudio::new(
                handle,
                original_filename,
                content_type,
                size_bytes,
            ));
        }
    }

    async fn reject_extra_files<U>(&self, source: &mut U) -> Result<(), IngestError>
    where
        U: UploadSource + ?Sized,
    {
        while let Some(part) = source.next_part().await? {
            if part.is_file() {
                tracing::warn!(filename = ?part.file_name, "Rejecting upload with more than one file");
                return Err(IngestError::MultipleFiles);
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("request contains no file part")]
    NoFile,
    #[error("request contains more than one file part")]
    MultipleFiles,
    #[error("malformed multipart body: {0}")]
    Malformed(String),
    #[error("upload stream ended before the file was complete: {0}")]
    Incomplete(String),
    #[error("temp storage: {0}")]
    Storage(#[from] TempStoreError),
}

impl From<UploadSourceError> for IngestError {
    fn from(e: UploadSourceError) -> Self {
        match e {
            UploadSourceError::Malformed(msg) => IngestError::Malformed(msg),
            UploadSourceError::Interrupted(msg) => IngestError::Incomplete(msg),
        }
    }
}
