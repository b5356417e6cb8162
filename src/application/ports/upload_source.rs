use super::ByteStream;

/// One part of an incoming multipart body.
pub struct UploadPart<'a> {
    pub field_name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: ByteStream<'a>,
}

impl UploadPart<'_> {
    pub fn is_file(&self) -> bool {
        self.file_name.is_some()
    }
}

/// A streamed multipart request body, consumed part by part.
#[async_trait::async_trait]
pub trait UploadSource: Send {
    /// The next part, or `None` once the body is exhausted. A part must be
    /// fully consumed or dropped before asking for the next one.
    async fn next_part(&mut self) -> Result<Option<UploadPart<'_>>, UploadSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadSourceError {
    #[error("malformed multipart body: {0}")]
    Malformed(String),
    #[error("body stream interrupted: {0}")]
    Interrupted(String),
}
