//! Error types for the signal pipeline

use thiserror::Error;

/// Pipeline error type
///
/// Every error is local to one symbol's tick: the orchestrator converts
/// these into structured per-symbol outcomes and keeps sweeping.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Arbitration error: {0}")]
    Arbitration(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, PipelineError>;
