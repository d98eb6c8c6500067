use thiserror::Error;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors produced when turning a short code back into its counter value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("short code is empty")]
    Empty,
    #[error("invalid base58 symbol {symbol:?} at index {index}")]
    InvalidSymbol { symbol: char, index: usize },
    #[error("short code is not in canonical form: {0}")]
    NonCanonical(String),
    #[error("short code does not fit in 64 bits: {0}")]
    Overflow(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("collection does not exist: {0}")]
    CollectionMissing(String),
    #[error("failed to open storage: {0}")]
    Open(String),
    #[error("storage transaction failed: {0}")]
    Transaction(String),
    #[error("failed to encode record: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CodecError> for ShortenerError {
    fn from(value: CodecError) -> Self {
        Self::InvalidShortCode(value.to_string())
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(code) => Self::NotFound(code),
            StorageError::CollectionMissing(_) => Self::NotFound(value.to_string()),
            StorageError::Encode(message) => Self::Encode(message),
            other => Self::Storage(other.to_string()),
        }
    }
}
