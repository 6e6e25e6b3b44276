//! Error types for preview rendering

use std::path::{Path, PathBuf};

/// Preview surface errors
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// IO error while writing a preview
    #[error("io error writing {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl PreviewError {
    /// Create IO error for path
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
