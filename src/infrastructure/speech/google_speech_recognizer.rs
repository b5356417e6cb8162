use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{SpeechRecognizer, SpeechRecognizerError};
use crate::domain::{RecognitionRequest, RecognitionSegment};

const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";
pub const DEFAULT_METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// How requests to the recognizer are authorized.
#[derive(Debug, Clone)]
pub enum SpeechCredentials {
    ApiKey(String),
    AccessToken(String),
    /// Token minted by the hosting environment's metadata server for the
    /// attached service account.
    MetadataServer { token_url: String },
}

impl Default for SpeechCredentials {
    fn default() -> Self {
        SpeechCredentials::MetadataServer {
            token_url: DEFAULT_METADATA_TOKEN_URL.to_string(),
        }
    }
}

/// Google Cloud Speech-to-Text v1 synchronous `speech:recognize`.
pub struct GoogleSpeechRecognizer {
    client: reqwest::Client,
    endpoint: String,
    credentials: SpeechCredentials,
}

impl GoogleSpeechRecognizer {
    pub fn new(endpoint: Option<String>, credentials: SpeechCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            credentials,
        }
    }

    async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, SpeechRecognizerError> {
        match &self.credentials {
            SpeechCredentials::ApiKey(key) => Ok(request.query(&[("key", key)])),
            SpeechCredentials::AccessToken(token) => Ok(request.bearer_auth(token)),
            SpeechCredentials::MetadataServer { token_url } => {
                let token = self.metadata_token(token_url).await?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    async fn metadata_token(&self, token_url: &str) -> Result<String, SpeechRecognizerError> {
        let response = self
            .client
            .get(token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SpeechRecognizerError::CredentialsUnavailable(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(SpeechRecognizerError::CredentialsUnavailable(format!(
                "metadata server status {}",
                response.status()
            )));
        }

        let token: MetadataToken = response.json().await.map_err(|e| {
            SpeechRecognizerError::CredentialsUnavailable(format!("parse token: {}", e))
        })?;

        Ok(token.access_token)
    }
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResultDto>,
}

#[derive(Deserialize)]
struct RecognitionResultDto {
    #[serde(default)]
    alternatives: Vec<AlternativeDto>,
}

#[derive(Deserialize)]
struct AlternativeDto {
    #[serde(default)]
    transcript: String,
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionSegment>, SpeechRecognizerError> {
        let http_request = self
            .authorize(self.client.post(&self.endpoint).json(request))
            .await?;

        tracing::debug!(endpoint = %self.endpoint, "Sending audio to Google Speech");

        let response = http_request
            .send()
            .await
            .map_err(|e| SpeechRecognizerError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SpeechRecognizerError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let result: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechRecognizerError::InvalidResponse(format!("parse response: {}", e)))?;

        Ok(result
            .results
            .into_iter()
            .map(|r| {
                RecognitionSegment::new(r.alternatives.into_iter().map(|a| a.transcript).collect())
            })
            .collect())
    }
}
