use async_trait::async_trait;

use crate::domain::{RecognitionRequest, RecognitionSegment};

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// One synchronous recognition call. Segments come back in service order;
    /// an empty list is a valid answer.
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionSegment>, SpeechRecognizerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechRecognizerError {
    #[error("credentials unavailable: {0}")]
    CredentialsUnavailable(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
