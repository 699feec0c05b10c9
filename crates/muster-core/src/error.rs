use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum MusterError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
