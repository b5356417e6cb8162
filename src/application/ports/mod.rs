mod conversion_service;
mod speech_recognizer;
mod temp_file_store;
mod upload_source;

pub use conversion_service::{ConversionService, ConversionServiceError};
pub use speech_recognizer::{SpeechRecognizer, SpeechRecognizerError};
pub use temp_file_store::{ByteStream, TempFileStore, TempStoreError};
pub use upload_source::{UploadPart, UploadSource, UploadSourceError};
