use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Structural problem with caller-supplied data: non-positive reserves,
    /// negative trade amounts, empty series/paths, mismatched array lengths.
    /// Raised at the function boundary before any partial computation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Inputs were individually valid but the numerics broke down:
    /// a division-by-zero guard fired or a Newton-Raphson solve failed to
    /// converge within its iteration cap.
    #[error("numeric degeneracy: {0}")]
    NumericDegenerate(String),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
