use super::TempFileHandle;

const DEFAULT_STEM: &str = "audio";

/// The file the client uploaded, materialized on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAudio {
    pub handle: TempFileHandle,
    pub original_filename: String,
    pub stem: String,
    pub content_type: Option<String>,
    pub size_bytes: u64,
}

impl UploadedAudio {
    pub fn new(
        handle: TempFileHandle,
        original_filename: String,
        content_type: Option<String>,
        size_bytes: u64,
    ) -> Self {
        let stem = filename_stem(&original_filename);
        Self {
            handle,
            original_filename,
            stem,
            content_type,
            size_bytes,
        }
    }
}

/// The conversion service's output: PCM WAV at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedAudio {
    pub handle: TempFileHandle,
    pub filename: String,
    pub size_bytes: u64,
}

/// Text before the last `.` of the basename, reduced to characters that are
/// safe in a file name. Falls back to `audio` when nothing usable is left.
pub fn filename_stem(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let stem = match basename.rfind('.') {
        Some(0) | None => basename,
        Some(idx) => &basename[..idx],
    };

    let normalized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = normalized.trim_matches('_');
    if trimmed.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}
