#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use futures::{StreamExt, stream};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use audio_to_text::application::ports::{
    ByteStream, ConversionService, ConversionServiceError, SpeechRecognizer,
    SpeechRecognizerError, TempFileStore, TempStoreError, UploadPart, UploadSource,
    UploadSourceError,
};
use audio_to_text::application::services::{
    ConversionOrchestrator, MultipartIngestor, TranscriptionClient, TranscriptionPipeline,
};
use audio_to_text::domain::{
    ConversionJob, ConversionProfile, ConversionRequest, ConversionTask, RecognitionConfig,
    RecognitionRequest, RecognitionSegment, ResultFile, TaskOperation, TaskStatus,
    TempFileHandle, UploadForm,
};
use audio_to_text::infrastructure::storage::LocalTempFileStore;

pub const CONVERTED_WAV: &[u8] = b"RIFF....WAVEfmt converted-pcm-bytes";
pub const UPLOAD_URL: &str = "https://upload.test/import";
pub const EXPORT_URL: &str = "https://storage.test/out.wav";

pub struct FakePart {
    pub field_name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub chunks: Vec<Result<Bytes, io::Error>>,
}

impl FakePart {
    pub fn file(file_name: &str, content: &'static [u8]) -> Self {
        Self {
            field_name: Some("audio".to_string()),
            file_name: Some(file_name.to_string()),
            content_type: Some("audio/mp4".to_string()),
            chunks: content
                .chunks(4)
                .map(|c| Ok(Bytes::from_static(c)))
                .collect(),
        }
    }

    pub fn text(field_name: &str, value: &'static str) -> Self {
        Self {
            field_name: Some(field_name.to_string()),
            file_name: None,
            content_type: None,
            chunks: vec![Ok(Bytes::from_static(value.as_bytes()))],
        }
    }

    pub fn interrupted(file_name: &str) -> Self {
        Self {
            field_name: Some("audio".to_string()),
            file_name: Some(file_name.to_string()),
            content_type: Some("audio/mp4".to_string()),
            chunks: vec![
                Ok(Bytes::from_static(b"partial")),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "network drop")),
            ],
        }
    }
}

/// In-memory multipart body.
pub struct VecUploadSource {
    parts: VecDeque<FakePart>,
    trailing_error: Option<String>,
}

impl VecUploadSource {
    pub fn new(parts: Vec<FakePart>) -> Self {
        Self {
            parts: parts.into(),
            trailing_error: None,
        }
    }

    pub fn malformed(message: &str) -> Self {
        Self {
            parts: VecDeque::new(),
            trailing_error: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl UploadSource for VecUploadSource {
    async fn next_part(&mut self) -> Result<Option<UploadPart<'_>>, UploadSourceError> {
        match self.parts.pop_front() {
            Some(part) => Ok(Some(UploadPart {
                field_name: part.field_name,
                file_name: part.file_name,
                content_type: part.content_type,
                body: stream::iter(part.chunks).boxed(),
            })),
            None => match self.trailing_error.take() {
                Some(msg) => Err(UploadSourceError::Malformed(msg)),
                None => Ok(None),
            },
        }
    }
}

/// Local store that counts allocations.
pub struct CountingStore {
    inner: LocalTempFileStore,
    allocations: AtomicUsize,
}

impl CountingStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            inner: LocalTempFileStore::new(dir).unwrap(),
            allocations: AtomicUsize::new(0),
        }
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TempFileStore for CountingStore {
    async fn allocate(&self, suggested_name: &str) -> Result<TempFileHandle, TempStoreError> {
        self.allocations.fetch_add(1, Ordering::SeqCst);
        self.inner.allocate(suggested_name).await
    }

    async fn write(
        &self,
        handle: &TempFileHandle,
        stream: ByteStream<'_>,
    ) -> Result<u64, TempStoreError> {
        self.inner.write(handle, stream).await
    }

    async fn open(
        &self,
        handle: &TempFileHandle,
    ) -> Result<(ByteStream<'static>, u64), TempStoreError> {
        self.inner.open(handle).await
    }

    async fn read(&self, handle: &TempFileHandle) -> Result<Vec<u8>, TempStoreError> {
        self.inner.read(handle).await
    }

    async fn release(&self, handle: &TempFileHandle) -> Result<(), TempStoreError> {
        self.inner.release(handle).await
    }

    fn discard(&self, handle: &TempFileHandle) {
        self.inner.discard(handle)
    }
}

#[derive(Default)]
pub struct FakeConversionService {
    pub failing_task: Option<&'static str>,
    pub reject_upload: bool,
    pub fail_download: bool,
    pub hang_on_wait: bool,
    pub omit_export_file: bool,
    pub omit_upload_form: bool,
    pub requests: Mutex<Vec<ConversionRequest>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
}

pub struct RecordedUpload {
    pub url: String,
    pub fields: Vec<(String, String)>,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl FakeConversionService {
    pub fn failing_at(task: &'static str) -> Self {
        Self {
            failing_task: Some(task),
            ..Default::default()
        }
    }

    pub fn rejecting_upload() -> Self {
        Self {
            reject_upload: true,
            ..Default::default()
        }
    }

    pub fn failing_download() -> Self {
        Self {
            fail_download: true,
            ..Default::default()
        }
    }

    pub fn never_finishing() -> Self {
        Self {
            hang_on_wait: true,
            ..Default::default()
        }
    }

    pub fn without_export_file() -> Self {
        Self {
            omit_export_file: true,
            ..Default::default()
        }
    }

    pub fn without_upload_form() -> Self {
        Self {
            omit_upload_form: true,
            ..Default::default()
        }
    }

    pub fn job_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn task(&self, name: &str, operation: TaskOperation, status: TaskStatus) -> ConversionTask {
        ConversionTask {
            id: format!("{}-id", name),
            name: name.to_string(),
            operation,
            status,
            message: None,
            upload_form: None,
            files: Vec::new(),
        }
    }
}

#[async_trait]
impl ConversionService for FakeConversionService {
    async fn create_job(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionJob, ConversionServiceError> {
        self.requests.lock().unwrap().push(request.clone());

        let mut import = self.task("import-1", TaskOperation::Import, TaskStatus::Pending);
        import.upload_form = (!self.omit_upload_form).then(|| UploadForm {
            url: UPLOAD_URL.to_string(),
            parameters: vec![
                ("expires".to_string(), "1700000000".to_string()),
                ("signature".to_string(), "abc123".to_string()),
            ],
        });

        Ok(ConversionJob::new(
            "job-1",
            vec![
                import,
                self.task("convert-1", TaskOperation::Convert, TaskStatus::Pending),
                self.task("export-1", TaskOperation::Export, TaskStatus::Pending),
            ],
        ))
    }

    async fn upload(
        &self,
        form: &UploadForm,
        file_name: &str,
        mut content: ByteStream<'static>,
        _content_length: u64,
    ) -> Result<(), ConversionServiceError> {
        let mut buf = Vec::new();
        while let Some(chunk) = content.next().await {
            let chunk = chunk.map_err(|e| ConversionServiceError::UploadFailed(e.to_string()))?;
            buf.extend_from_slice(&chunk);
        }
        self.uploads.lock().unwrap().push(RecordedUpload {
            url: form.url.clone(),
            fields: form.parameters.clone(),
            file_name: file_name.to_string(),
            content: buf,
        });

        if self.reject_upload {
            return Err(ConversionServiceError::UploadFailed(
                "status 403 Forbidden".to_string(),
            ));
        }
        Ok(())
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<ConversionJob, ConversionServiceError> {
        if self.hang_on_wait {
            std::future::pending::<()>().await;
        }

        let output_filename = self
            .requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.output_filename.clone())
            .unwrap_or_default();

        let status_of = |name: &str| {
            if self.failing_task == Some(name) {
                TaskStatus::Failed
            } else {
                TaskStatus::Finished
            }
        };

        let import = self.task("import-1", TaskOperation::Import, status_of("import-1"));
        let mut convert = self.task("convert-1", TaskOperation::Convert, status_of("convert-1"));
        let mut export = self.task("export-1", TaskOperation::Export, status_of("export-1"));

        if convert.status == TaskStatus::Failed {
            convert.message = Some("Unsupported input".to_string());
        }
        if export.status == TaskStatus::Finished && !self.omit_export_file {
            export.files = vec![ResultFile {
                filename: output_filename,
                url: EXPORT_URL.to_string(),
            }];
        } else {
            if export.status == TaskStatus::Failed {
                export.message = Some("Export failed".to_string());
            }
        }

        Ok(ConversionJob::new(job_id, vec![import, convert, export]))
    }

    async fn download(&self, _url: &str) -> Result<ByteStream<'static>, ConversionServiceError> {
        if self.fail_download {
            return Err(ConversionServiceError::DownloadFailed(
                "status 404 Not Found".to_string(),
            ));
        }
        let (head, tail) = CONVERTED_WAV.split_at(8);
        Ok(stream::iter(vec![
            Ok(Bytes::from_static(head)),
            Ok(Bytes::from_static(tail)),
        ])
        .boxed())
    }
}

pub struct FakeSpeechRecognizer {
    response: Result<Vec<Vec<&'static str>>, &'static str>,
    pub requests: Mutex<Vec<RecognitionRequest>>,
}

impl FakeSpeechRecognizer {
    pub fn returning(segments: Vec<Vec<&'static str>>) -> Self {
        Self {
            response: Ok(segments),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            response: Err(message),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechRecognizer for FakeSpeechRecognizer {
    async fn recognize(
        &self,
        request: &RecognitionRequest,
    ) -> Result<Vec<RecognitionSegment>, SpeechRecognizerError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.response {
            Ok(segments) => Ok(segments
                .iter()
                .map(|alts| RecognitionSegment::new(alts.iter().map(|a| a.to_string()).collect()))
                .collect()),
            Err(msg) => Err(SpeechRecognizerError::ApiRequestFailed(msg.to_string())),
        }
    }
}

pub fn build_pipeline(
    store: Arc<dyn TempFileStore>,
    conversion: Arc<FakeConversionService>,
    recognizer: Arc<FakeSpeechRecognizer>,
) -> TranscriptionPipeline {
    build_pipeline_with_timeout(store, conversion, recognizer, None)
}

pub fn build_pipeline_with_timeout(
    store: Arc<dyn TempFileStore>,
    conversion: Arc<FakeConversionService>,
    recognizer: Arc<FakeSpeechRecognizer>,
    wait_timeout: Option<Duration>,
) -> TranscriptionPipeline {
    let profile = ConversionProfile::default();
    TranscriptionPipeline::new(
        store,
        MultipartIngestor::new(profile.input_format.clone()),
        ConversionOrchestrator::new(conversion, profile, wait_timeout),
        TranscriptionClient::new(recognizer, RecognitionConfig::default()),
    )
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Serves `app` on an ephemeral port until the returned sender fires.
pub async fn spawn_server(app: Router) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}
