use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::multipart;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::application::ports::{ByteStream, ConversionService, ConversionServiceError};
use crate::domain::{
    CONVERT_TASK, ConversionJob, ConversionRequest, ConversionTask, EXPORT_TASK, IMPORT_TASK,
    ResultFile, TaskOperation, TaskStatus, UploadForm,
};

const DEFAULT_BASE_URL: &str = "https://api.cloudconvert.com/v2";
const DEFAULT_SYNC_BASE_URL: &str = "https://sync.api.cloudconvert.com/v2";
/// Pause before asking the sync endpoint again after it returned early.
const SYNC_RETRY_DELAY: Duration = Duration::from_secs(1);

/// CloudConvert v2 REST client.
///
/// Without a poll interval, job completion is awaited through the blocking
/// endpoint on the sync host. With one, the regular job status endpoint is
/// polled at that interval instead.
pub struct CloudConvertClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    sync_base_url: String,
    poll_interval: Option<Duration>,
}

impl CloudConvertClient {
    pub fn new(api_key: String, base_url: Option<String>, sync_base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            sync_base_url: sync_base_url
                .unwrap_or_else(|| DEFAULT_SYNC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_interval: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    fn job_status_url(&self, job_id: &str) -> String {
        match self.poll_interval {
            Some(_) => format!("{}/jobs/{}", self.base_url, job_id),
            None => format!("{}/jobs/{}", self.sync_base_url, job_id),
        }
    }

    async fn fetch_job(&self, url: &str) -> Result<ConversionJob, ConversionServiceError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ConversionServiceError::WaitFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ConversionServiceError::WaitFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let envelope: JobEnvelope = response
            .json()
            .await
            .map_err(|e| ConversionServiceError::InvalidResponse(format!("parse job: {}", e)))?;

        Ok(envelope.data.into_domain())
    }
}

/// The three-task job body: import/upload → convert → export/url.
pub fn job_payload(request: &ConversionRequest) -> Value {
    let profile = &request.profile;

    let mut convert = json!({
        "operation": "convert",
        "input": [IMPORT_TASK],
        "input_format": profile.input_format,
        "output_format": profile.output_format,
        "engine": profile.engine,
        "audio_codec": profile.audio_codec,
        "audio_bitrate": profile.audio_bitrate,
        "filename": request.output_filename,
    });
    if let (Some(rate), Some(obj)) = (profile.sample_rate_hertz, convert.as_object_mut()) {
        obj.insert("audio_frequency".to_string(), json!(rate));
    }

    let mut tasks = Map::new();
    tasks.insert(
        IMPORT_TASK.to_string(),
        json!({ "operation": "import/upload" }),
    );
    tasks.insert(CONVERT_TASK.to_string(), convert);
    tasks.insert(
        EXPORT_TASK.to_string(),
        json!({
            "operation": "export/url",
            "input": [CONVERT_TASK],
            "inline": false,
            "archive_multiple_files": false,
        }),
    );

    json!({ "tasks": tasks })
}

#[derive(Deserialize)]
struct JobEnvelope {
    data: JobDto,
}

#[derive(Deserialize)]
struct JobDto {
    id: String,
    #[serde(default)]
    tasks: Vec<TaskDto>,
}

#[derive(Deserialize)]
struct TaskDto {
    id: String,
    #[serde(default)]
    name: Option<String>,
    operation: String,
    status: TaskStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<TaskResultDto>,
}

#[derive(Deserialize)]
struct TaskResultDto {
    #[serde(default)]
    form: Option<FormDto>,
    #[serde(default)]
    files: Vec<FileDto>,
}

#[derive(Deserialize)]
struct FormDto {
    url: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

#[derive(Deserialize)]
struct FileDto {
    filename: String,
    #[serde(default)]
    url: Option<String>,
}

impl JobDto {
    fn into_domain(self) -> ConversionJob {
        let tasks = self.tasks.into_iter().map(TaskDto::into_domain).collect();
        ConversionJob::new(self.id, tasks)
    }
}

impl TaskDto {
    fn into_domain(self) -> ConversionTask {
        let (upload_form, files) = match self.result {
            Some(result) => {
                let form = result.form.map(|f| UploadForm {
                    url: f.url,
                    parameters: f
                        .parameters
                        .into_iter()
                        .map(|(k, v)| match v {
                            Value::String(s) => (k, s),
                            other => (k, other.to_string()),
                        })
                        .collect(),
                });
                let files = result
                    .files
                    .into_iter()
                    .filter_map(|f| {
                        f.url.map(|url| ResultFile {
                            filename: f.filename,
                            url,
                        })
                    })
                    .collect();
                (form, files)
            }
            None => (None, Vec::new()),
        };

        ConversionTask {
            id: self.id,
            name: self.name.unwrap_or_default(),
            operation: TaskOperation::from_operation(&self.operation),
            status: self.status,
            message: self.message,
            upload_form,
            files,
        }
    }
}

#[async_trait]
impl ConversionService for CloudConvertClient {
    async fn create_job(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionJob, ConversionServiceError> {
        let url = format!("{}/jobs", self.base_url);

        tracing::debug!(
            output = %request.output_filename,
            input_format = %request.profile.input_format,
            "Creating CloudConvert job"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&job_payload(request))
            .send()
            .await
            .map_err(|e| ConversionServiceError::JobCreationFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ConversionServiceError::JobCreationFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let envelope: JobEnvelope = response
            .json()
            .await
            .map_err(|e| ConversionServiceError::InvalidResponse(format!("parse job: {}", e)))?;

        Ok(envelope.data.into_domain())
    }

    async fn upload(
        &self,
        form: &UploadForm,
        file_name: &str,
        content: ByteStream<'static>,
        content_length: u64,
    ) -> Result<(), ConversionServiceError> {
        let mut body = multipart::Form::new();
        for (key, value) in &form.parameters {
            body = body.text(key.clone(), value.clone());
        }

        let file_part =
            multipart::Part::stream_with_length(reqwest::Body::wrap_stream(content), content_length)
                .file_name(file_name.to_string());
        body = body.part("file", file_part);

        tracing::debug!(fields = form.parameters.len(), bytes = content_length, "Uploading source file");

        let response = self
            .client
            .post(&form.url)
            .bearer_auth(&self.api_key)
            .multipart(body)
            .send()
            .await
            .map_err(|e| ConversionServiceError::UploadFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ConversionServiceError::UploadFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<ConversionJob, ConversionServiceError> {
        let url = self.job_status_url(job_id);
        loop {
            let job = self.fetch_job(&url).await?;
            if job.is_terminal() {
                tracing::debug!(job_id = %job.id, "CloudConvert job reached terminal state");
                return Ok(job);
            }
            tracing::debug!(job_id = %job.id, "CloudConvert job still running");
            tokio::time::sleep(self.poll_interval.unwrap_or(SYNC_RETRY_DELAY)).await;
        }
    }

    async fn download(&self, url: &str) -> Result<ByteStream<'static>, ConversionServiceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ConversionServiceError::DownloadFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ConversionServiceError::DownloadFailed(format!(
                "status {}",
                response.status()
            )));
        }

        Ok(response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed())
    }
}
