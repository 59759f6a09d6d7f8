use thiserror::Error;

pub type RevoaResult<T> = Result<T, RevoaError>;

#[derive(Error, Debug)]
pub enum RevoaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown automation rule: {0}")]
    UnknownRule(String),

    #[error("Automation rule error: {0}")]
    Automation(String),

    #[error("Platform sync error: {0}")]
    Sync(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
