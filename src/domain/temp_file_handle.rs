use std::fmt;
use std::path::{Path, PathBuf};

/// A file allocated in ephemeral storage for the lifetime of one request.
///
/// `key` is the location relative to the store root, `path` the absolute
/// location on disk. The handle itself carries no deletion logic; whoever
/// allocated it through a `TempFileScope` owns the obligation to release it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempFileHandle {
    key: String,
    path: PathBuf,
}

impl TempFileHandle {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.key)
    }
}

impl fmt::Display for TempFileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
