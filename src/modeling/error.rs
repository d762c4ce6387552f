// Errors raised by the modeling layer
// All of them are programmer errors surfaced at the offending call

use crate::domain::SolverError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The operation needs a solved model that does not exist yet
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed construction input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation has no meaning for linear models
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
