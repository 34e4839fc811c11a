use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("record already written: {0}")]
    AlreadyWritten(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
