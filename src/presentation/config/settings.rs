use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::domain::{ConversionProfile, RecognitionConfig};
use crate::infrastructure::speech::{DEFAULT_METADATA_TOKEN_URL, SpeechCredentials};

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub conversion: ConversionSettings,
    pub speech: SpeechSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    pub temp_dir: Option<String>,
}

impl StorageSettings {
    pub fn temp_dir_path(&self) -> PathBuf {
        match &self.temp_dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::temp_dir().join("audio-to-text"),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct ConversionSettings {
    pub base_url: Option<String>,
    pub sync_base_url: Option<String>,
    pub api_key: String,
    pub input_format: String,
    pub output_format: String,
    pub audio_codec: String,
    pub audio_bitrate: u32,
    pub engine: String,
    pub sample_rate_hertz: Option<u32>,
    pub poll_interval_ms: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
}

impl ConversionSettings {
    pub fn profile(&self) -> ConversionProfile {
        ConversionProfile {
            input_format: self.input_format.clone(),
            output_format: self.output_format.clone(),
            audio_codec: self.audio_codec.clone(),
            audio_bitrate: self.audio_bitrate,
            engine: self.engine.clone(),
            sample_rate_hertz: self.sample_rate_hertz,
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl std::fmt::Debug for ConversionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionSettings")
            .field("base_url", &self.base_url)
            .field("sync_base_url", &self.sync_base_url)
            .field("api_key", &"<redacted>")
            .field("input_format", &self.input_format)
            .field("output_format", &self.output_format)
            .field("audio_codec", &self.audio_codec)
            .field("audio_bitrate", &self.audio_bitrate)
            .field("engine", &self.engine)
            .field("sample_rate_hertz", &self.sample_rate_hertz)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("wait_timeout_secs", &self.wait_timeout_secs)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct SpeechSettings {
    pub endpoint: Option<String>,
    pub encoding: String,
    pub language_code: String,
    pub sample_rate_hertz: u32,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub metadata_url: Option<String>,
}

impl SpeechSettings {
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            encoding: self.encoding.clone(),
            sample_rate_hertz: self.sample_rate_hertz,
            language_code: self.language_code.clone(),
        }
    }

    /// API key first, then an explicit token, otherwise the metadata server.
    pub fn credentials(&self) -> SpeechCredentials {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();

        if let Some(key) = non_empty(&self.api_key) {
            SpeechCredentials::ApiKey(key)
        } else if let Some(token) = non_empty(&self.access_token) {
            SpeechCredentials::AccessToken(token)
        } else {
            SpeechCredentials::MetadataServer {
                token_url: non_empty(&self.metadata_url)
                    .unwrap_or_else(|| DEFAULT_METADATA_TOKEN_URL.to_string()),
            }
        }
    }
}

impl std::fmt::Debug for SpeechSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSettings")
            .field("endpoint", &self.endpoint)
            .field("encoding", &self.encoding)
            .field("language_code", &self.language_code)
            .field("sample_rate_hertz", &self.sample_rate_hertz)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("metadata_url", &self.metadata_url)
            .finish()
    }
}

impl Settings {
    /// Defaults, then `appsettings.<environment>` if present, then `APP__*`
    /// environment variables (`APP__CONVERSION__API_KEY`, ...).
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let file_name = environment.config_file_name();

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.max_upload_mb", 200)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .set_default("conversion.api_key", "")?
            .set_default("conversion.input_format", "m4a")?
            .set_default("conversion.output_format", "wav")?
            .set_default("conversion.audio_codec", "pcm_s16le")?
            .set_default("conversion.audio_bitrate", 128)?
            .set_default("conversion.engine", "ffmpeg")?
            .set_default("conversion.sample_rate_hertz", 44_100)?
            .set_default("conversion.wait_timeout_secs", 600)?
            .set_default("speech.encoding", "LINEAR16")?
            .set_default("speech.language_code", "en-US")?
            .set_default("speech.sample_rate_hertz", 44_100)?
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
