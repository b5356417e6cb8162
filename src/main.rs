use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use audio_to_text::application::ports::{ConversionService, SpeechRecognizer, TempFileStore};
use audio_to_text::application::services::{
    ConversionOrchestrator, MultipartIngestor, TranscriptionClient, TranscriptionPipeline,
};
use audio_to_text::infrastructure::conversion::CloudConvertClient;
use audio_to_text::infrastructure::observability::{TracingConfig, init_tracing};
use audio_to_text::infrastructure::speech::GoogleSpeechRecognizer;
use audio_to_text::infrastructure::storage::LocalTempFileStore;
use audio_to_text::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        &settings.logging.level,
        settings.logging.enable_json,
    ))
    .context("Failed to install tracing subscriber")?;

    anyhow::ensure!(
        !settings.conversion.api_key.is_empty(),
        "APP__CONVERSION__API_KEY must be set"
    );

    let temp_dir = settings.storage.temp_dir_path();
    let store: Arc<dyn TempFileStore> = Arc::new(
        LocalTempFileStore::new(&temp_dir).context("Failed to prepare temp directory")?,
    );
    tracing::info!(temp_dir = %temp_dir.display(), "Temp file store ready");

    let conversion_service: Arc<dyn ConversionService> = Arc::new(
        CloudConvertClient::new(
            settings.conversion.api_key.clone(),
            settings.conversion.base_url.clone(),
            settings.conversion.sync_base_url.clone(),
        )
        .with_poll_interval(settings.conversion.poll_interval()),
    );

    let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(GoogleSpeechRecognizer::new(
        settings.speech.endpoint.clone(),
        settings.speech.credentials(),
    ));

    let profile = settings.conversion.profile();
    let pipeline = Arc::new(TranscriptionPipeline::new(
        Arc::clone(&store),
        MultipartIngestor::new(profile.input_format.clone()),
        ConversionOrchestrator::new(
            conversion_service,
            profile,
            settings.conversion.wait_timeout(),
        ),
        TranscriptionClient::new(recognizer, settings.speech.recognition_config()),
    ));

    let state = AppState {
        pipeline,
        max_upload_bytes: settings.server.max_upload_bytes(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!(%addr, environment = %environment, "Transcription gateway listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
