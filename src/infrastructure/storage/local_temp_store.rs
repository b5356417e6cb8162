use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};
use uuid::Uuid;

use crate::application::ports::{ByteStream, TempFileStore, TempStoreError};
use crate::domain::TempFileHandle;

const MAX_NAME_LEN: usize = 96;

/// Temp files under a single local directory. Names are prefixed with a
/// fresh UUID so concurrent requests never collide.
pub struct LocalTempFileStore {
    root: PathBuf,
    inner: Arc<LocalFileSystem>,
}

impl LocalTempFileStore {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, TempStoreError> {
        std::fs::create_dir_all(base_path.as_ref())?;
        let root = base_path.as_ref().canonicalize()?;
        let fs = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| TempStoreError::AllocationFailed(e.to_string()))?;
        Ok(Self {
            root,
            inner: Arc::new(fs),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Reduces a suggested name to a single path segment of portable characters.
fn sanitize_name(suggested: &str) -> String {
    let basename = suggested.rsplit(['/', '\\']).next().unwrap_or(suggested);
    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

fn store_path(handle: &TempFileHandle) -> StorePath {
    StorePath::from(handle.key())
}

fn map_get_error(handle: &TempFileHandle, e: object_store::Error) -> TempStoreError {
    match e {
        object_store::Error::NotFound { .. } => TempStoreError::NotFound(handle.key().to_string()),
        other => TempStoreError::ReadFailed(other.to_string()),
    }
}

#[async_trait::async_trait]
impl TempFileStore for LocalTempFileStore {
    async fn allocate(&self, suggested_name: &str) -> Result<TempFileHandle, TempStoreError> {
        let key = format!("{}-{}", Uuid::new_v4().simple(), sanitize_name(suggested_name));
        let path = self.root.join(&key);
        Ok(TempFileHandle::new(key, path))
    }

    async fn write(
        &self,
        handle: &TempFileHandle,
        mut stream: BoxStream<'_, Result<bytes::Bytes, io::Error>>,
    ) -> Result<u64, TempStoreError> {
        let mut upload = self
            .inner
            .put_multipart(&store_path(handle))
            .await
            .map_err(|e| TempStoreError::WriteFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(TempStoreError::SourceFailed(e));
                }
            };
            if bytes.is_empty() {
                continue;
            }
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(TempStoreError::WriteFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| TempStoreError::WriteFailed(e.to_string()))?;

        Ok(total_bytes)
    }

    async fn open(
        &self,
        handle: &TempFileHandle,
    ) -> Result<(ByteStream<'static>, u64), TempStoreError> {
        let result = self
            .inner
            .get(&store_path(handle))
            .await
            .map_err(|e| map_get_error(handle, e))?;

        let size = result.meta.size as u64;
        let stream = result.into_stream().map_err(io::Error::other).boxed();
        Ok((stream, size))
    }

    async fn read(&self, handle: &TempFileHandle) -> Result<Vec<u8>, TempStoreError> {
        let result = self
            .inner
            .get(&store_path(handle))
            .await
            .map_err(|e| map_get_error(handle, e))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| TempStoreError::ReadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn release(&self, handle: &TempFileHandle) -> Result<(), TempStoreError> {
        match self.inner.delete(&store_path(handle)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(TempStoreError::DeleteFailed(e.to_string())),
        }
    }

    fn discard(&self, handle: &TempFileHandle) {
        match std::fs::remove_file(handle.path()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, file = %handle, "Failed to discard temp file"),
        }
    }
}
