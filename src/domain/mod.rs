mod audio_file;
mod conversion_job;
mod conversion_request;
mod pipeline_stage;
mod recognition;
mod task_operation;
mod task_status;
mod temp_file_handle;
mod transcript;

pub use audio_file::{ConvertedAudio, UploadedAudio, filename_stem};
pub use conversion_job::{ConversionJob, ConversionTask, ResultFile, UploadForm};
pub use conversion_request::{
    CONVERT_TASK, ConversionProfile, ConversionRequest, EXPORT_TASK, IMPORT_TASK,
};
pub use pipeline_stage::PipelineStage;
pub use recognition::{RecognitionAudio, RecognitionConfig, RecognitionRequest, RecognitionSegment};
pub use task_operation::TaskOperation;
pub use task_status::TaskStatus;
pub use temp_file_handle::TempFileHandle;
pub use transcript::Transcript;
