mod health;
mod multipart_source;
mod transcribe;

pub use health::health_handler;
pub use multipart_source::MultipartUploadSource;
pub use transcribe::{
    ErrorResponse, TranscriptResponse, public_message, status_for, transcribe_handler,
};
