use std::io;

use axum::extract::Multipart;
use futures::{StreamExt, TryStreamExt};

use crate::application::ports::{UploadPart, UploadSource, UploadSourceError};

/// Exposes an axum `Multipart` body as an `UploadSource`.
pub struct MultipartUploadSource {
    multipart: Multipart,
}

impl MultipartUploadSource {
    pub fn new(multipart: Multipart) -> Self {
        Self { multipart }
    }
}

#[async_trait::async_trait]
impl UploadSource for MultipartUploadSource {
    async fn next_part(&mut self) -> Result<Option<UploadPart<'_>>, UploadSourceError> {
        let field = match self.multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(UploadSourceError::Malformed(e.body_text())),
        };

        let field_name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e.body_text()))
            .boxed();

        Ok(Some(UploadPart {
            field_name,
            file_name,
            content_type,
            body,
        }))
    }
}
