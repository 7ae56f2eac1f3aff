use thiserror::Error;

/// ZettelGPT core errors
#[derive(Error, Debug)]
pub enum ZettelError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Vault Error: {0}")]
    VaultError(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Link cycle detected at note: {0}")]
    CycleDetected(String),

    #[error("Conversation chain exceeds maximum depth of {0}")]
    ChainTooDeep(usize),

    #[error("Request Error: {0}")]
    RequestError(String),

    #[error("Response Error: {0}")]
    ResponseError(String),

    #[error("Parsing Error: {0}")]
    ParsingError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Result type for core operations
pub type ZettelResult<T> = Result<T, ZettelError>;
