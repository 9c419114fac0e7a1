use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeformError {
  #[error("invalid topology: {0}")]
  InvalidTopology(String),

  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  #[error("simulator is not initialized")]
  NotInitialized,

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DeformError>;
