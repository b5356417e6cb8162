use std::sync::Arc;

use crate::application::ports::{ByteStream, TempFileStore, TempStoreError};
use crate::domain::TempFileHandle;

/// Request-scoped ledger of temporary files.
///
/// Every handle allocated through the scope is recorded until it is
/// released. `release_all` deletes whatever is left; if the scope is dropped
/// first (for example because the request future was cancelled) the
/// remaining files are discarded synchronously.
pub struct TempFileScope {
    store: Arc<dyn TempFileStore>,
    handles: Vec<TempFileHandle>,
}

impl TempFileScope {
    pub fn new(store: Arc<dyn TempFileStore>) -> Self {
        Self {
            store,
            handles: Vec::new(),
        }
    }

    pub async fn allocate(&mut self, suggested_name: &str) -> Result<TempFileHandle, TempStoreError> {
        let handle = self.store.allocate(suggested_name).await?;
        tracing::debug!(file = %handle, "Temp file allocated");
        self.handles.push(handle.clone());
        Ok(handle)
    }

    pub async fn write(
        &self,
        handle: &TempFileHandle,
        stream: ByteStream<'_>,
    ) -> Result<u64, TempStoreError> {
        self.store.write(handle, stream).await
    }

    pub async fn open(
        &self,
        handle: &TempFileHandle,
    ) -> Result<(ByteStream<'static>, u64), TempStoreError> {
        self.store.open(handle).await
    }

    pub async fn read(&self, handle: &TempFileHandle) -> Result<Vec<u8>, TempStoreError> {
        self.store.read(handle).await
    }

    /// Deletes one file and drops it from the ledger. Handles the scope does
    /// not know about, or already released, are ignored.
    pub async fn release(&mut self, handle: &TempFileHandle) {
        let Some(pos) = self.handles.iter().position(|h| h == handle) else {
            return;
        };
        let handle = self.handles.swap_remove(pos);
        self.release_one(&handle).await;
    }

    pub async fn release_all(mut self) {
        let handles = std::mem::take(&mut self.handles);
        for handle in &handles {
            self.release_one(handle).await;
        }
    }

    pub fn allocated(&self) -> &[TempFileHandle] {
        &self.handles
    }

    async fn release_one(&self, handle: &TempFileHandle) {
        match self.store.release(handle).await {
            Ok(()) => tracing::debug!(file = %handle, "Temp file released"),
            Err(e) => {
                tracing::warn!(error = %e, file = %handle, "Failed to release temp file");
                self.store.discard(handle);
            }
        }
    }
}

impl Drop for TempFileScope {
    fn drop(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        tracing::warn!(
            count = self.handles.len(),
            "Request scope dropped with temp files outstanding, discarding"
        );
        for handle in self.handles.drain(..) {
            self.store.discard(&handle);
        }
    }
}
