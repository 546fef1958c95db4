use thiserror::Error;

/// Failures that can occur inside the classification pipeline. All of these
/// are recovered locally and mapped to a degraded verdict; `classify` itself
/// never returns an error. Storage failures never reach classification:
/// they are handled at the cache layer, which swallows them.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("malformed URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("remote classifier error: {0}")]
    Network(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
