use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};

use crate::application::ports::{SpeechRecognizer, SpeechRecognizerError, TempStoreError};
use crate::domain::{
    ConvertedAudio, RecognitionAudio, RecognitionConfig, RecognitionRequest, Transcript,
};

use super::TempFileScope;

pub struct TranscriptionClient {
    recognizer: Arc<dyn SpeechRecognizer>,
    config: RecognitionConfig,
}

impl TranscriptionClient {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>, config: RecognitionConfig) -> Self {
        Self { recognizer, config }
    }

    #[tracing::instrument(skip_all, fields(file = %audio.handle))]
    pub async fn transcribe(
        &self,
        audio: &ConvertedAudio,
        scope: &TempFileScope,
    ) -> Result<Transcript, TranscriptionClientError> {
        let data = scope.read(&audio.handle).await?;
        let request = self.build_request(&data);

        tracing::debug!(
            bytes = data.len(),
            encoding = %self.config.encoding,
            sample_rate_hertz = self.config.sample_rate_hertz,
            language_code = %self.config.language_code,
            "Sending audio to speech recognizer"
        );

        let segments = self.recognizer.recognize(&request).await?;
        let transcript = Transcript::from_segments(&segments);

        tracing::info!(
            segments = segments.len(),
            chars = transcript.text().len(),
            "Speech recognition completed"
        );

        Ok(transcript)
    }

    pub fn build_request(&self, data: &[u8]) -> RecognitionRequest {
        RecognitionRequest {
            config: self.config.clone(),
            audio: RecognitionAudio {
                content: general_purpose::STANDARD.encode(data),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionClientError {
    #[error("reading audio: {0}")]
    Storage(#[from] TempStoreError),
    #[error("recognition: {0}")]
    Recognition(#[from] SpeechRecognizerError),
}
