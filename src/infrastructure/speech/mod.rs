mod google_speech_recognizer;

pub use google_speech_recognizer::{
    DEFAULT_METADATA_TOKEN_URL, GoogleSpeechRecognizer, SpeechCredentials,
};
