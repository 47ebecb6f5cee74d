use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Dimension mismatch ({context}): expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize, context: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Generative backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// True for failures the pipeline absorbs into a degraded result.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Embedding(_) | Self::BackendUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
