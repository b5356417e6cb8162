use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionConfig {
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub language_code: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            encoding: "LINEAR16".to_string(),
            sample_rate_hertz: 44_100,
            language_code: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionAudio {
    /// Base64 of the raw file bytes.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionRequest {
    pub config: RecognitionConfig,
    pub audio: RecognitionAudio,
}

/// One result returned by the recognizer; alternatives are ranked best first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecognitionSegment {
    pub alternatives: Vec<String>,
}

impl RecognitionSegment {
    pub fn new(alternatives: Vec<String>) -> Self {
        Self { alternatives }
    }

    pub fn best(&self) -> Option<&str> {
        self.alternatives.first().map(String::as_str)
    }
}
