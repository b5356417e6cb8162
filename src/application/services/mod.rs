mod conversion_orchestrator;
mod multipart_ingestor;
mod temp_file_scope;
mod transcription_client;
mod transcription_pipeline;

pub use conversion_orchestrator::{ConversionError, ConversionOrchestrator};
pub use multipart_ingestor::{IngestError, MultipartIngestor};
pub use temp_file_scope::TempFileScope;
pub use transcription_client::{TranscriptionClient, TranscriptionClientError};
pub use transcription_pipeline::{PipelineError, TranscriptionPipeline};
