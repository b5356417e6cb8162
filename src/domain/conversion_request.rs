pub const IMPORT_TASK: &str = "import-1";
pub const CONVERT_TASK: &str = "convert-1";
pub const EXPORT_TASK: &str = "export-1";

/// Target format settings shared by every conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionProfile {
    pub input_format: String,
    pub output_format: String,
    pub audio_codec: String,
    pub audio_bitrate: u32,
    pub engine: String,
    pub sample_rate_hertz: Option<u32>,
}

impl Default for ConversionProfile {
    fn default() -> Self {
        Self {
            input_format: "m4a".to_string(),
            output_format: "wav".to_string(),
            audio_codec: "pcm_s16le".to_string(),
            audio_bitrate: 128,
            engine: "ffmpeg".to_string(),
            sample_rate_hertz: Some(44_100),
        }
    }
}

/// One import → convert → export job to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub profile: ConversionProfile,
    pub output_filename: String,
}

impl ConversionRequest {
    pub fn for_stem(profile: &ConversionProfile, stem: &str) -> Self {
        Self {
            output_filename: format!("{}.{}", stem, profile.output_format),
            profile: profile.clone(),
        }
    }
}
