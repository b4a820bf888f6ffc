//! Error types for Bassic

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum BmError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid block size: {0}")]
    InvalidBlockSize(usize),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Audio file error: {0}")]
    AudioFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type BmResult<T> = Result<T, BmError>;
