use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("document store failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Coarse classification used by whatever transport sits in front of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    ClientError,
    ServerError,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("search failed: {message}")]
    Failed { message: String },
}

impl SearchError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyQuery => ErrorClass::ClientError,
            Self::Failed { .. } => ErrorClass::ServerError,
        }
    }
}

impl From<StoreError> for SearchError {
    fn from(error: StoreError) -> Self {
        Self::failed(format!("document store read failed: {error}"))
    }
}

impl From<regex::Error> for SearchError {
    fn from(error: regex::Error) -> Self {
        Self::failed(format!("query matcher could not be built: {error}"))
    }
}
