use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::TempFileHandle;

pub type ByteStream<'a> = BoxStream<'a, Result<Bytes, io::Error>>;

/// Ephemeral, process-local file storage.
#[async_trait::async_trait]
pub trait TempFileStore: Send + Sync {
    /// Reserves a unique location derived from `suggested_name`. Nothing is
    /// written yet.
    async fn allocate(&self, suggested_name: &str) -> Result<TempFileHandle, TempStoreError>;

    /// Streams `stream` into the file. Returns only once every byte has been
    /// written and the file is complete.
    async fn write(
        &self,
        handle: &TempFileHandle,
        stream: ByteStream<'_>,
    ) -> Result<u64, TempStoreError>;

    /// Opens the file for streaming. Returns the stream and the file size.
    async fn open(
        &self,
        handle: &TempFileHandle,
    ) -> Result<(ByteStream<'static>, u64), TempStoreError>;

    async fn read(&self, handle: &TempFileHandle) -> Result<Vec<u8>, TempStoreError>;

    /// Deletes the file. Releasing a file that does not exist is not an error.
    async fn release(&self, handle: &TempFileHandle) -> Result<(), TempStoreError>;

    /// Synchronous best-effort delete for drop paths.
    fn discard(&self, handle: &TempFileHandle);
}

#[derive(Debug, thiserror::Error)]
pub enum TempStoreError {
    #[error("allocation failed: {0}")]
    AllocationFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("source stream failed: {0}")]
    SourceFailed(io::Error),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
