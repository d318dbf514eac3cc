use std::io;
use std::path::PathBuf;

/// Failures that abort a repair run. A chapter without a concept map is not an
/// error; it is reported as a skipped chapter instead.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize concept map: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("invalid concept map {}: {message}", path.display())]
    InvalidDocument { path: PathBuf, message: String },

    #[error("duplicate question reference '{filename}' in {chapter} ({first} and {second})")]
    DuplicateReference {
        chapter: String,
        filename: String,
        first: String,
        second: String,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl RepairError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            message: message.into(),
        }
    }
}
