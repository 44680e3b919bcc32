use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeapfrogError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Dimension Mismatch: expected {expected} values, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Option Parsing Error: {0}")]
    Options(#[from] serde_json::Error),

    #[error("Native Boundary Error: {0}")]
    Boundary(String),
}

pub type Result<T> = std::result::Result<T, LeapfrogError>;

pub(crate) fn config<T>(msg: impl Into<String>) -> Result<T> {
    Err(LeapfrogError::Config(msg.into()))
}
