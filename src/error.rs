use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarCountError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid repository: {0}")]
    InvalidRepository(String),

    #[error("Invalid API root: {0}")]
    InvalidApiRoot(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StarCountError {
    /// True when the caller's cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StarCountError::Cancelled)
    }

    /// True when the exchange with the API could not be completed.
    pub fn is_network(&self) -> bool {
        matches!(self, StarCountError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, StarCountError>;
