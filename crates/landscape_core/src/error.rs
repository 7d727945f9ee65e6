use thiserror::Error;

/// Errors surfaced by the landscape engine. Nothing is retried or masked locally.
#[derive(Debug, Error)]
pub enum LandscapeError {
    /// The bound function failed while being sampled.
    #[error(transparent)]
    Function(anyhow::Error),

    #[error("function returned non-finite value {value} at ({x}, {y})")]
    NonFinite { x: f64, y: f64, value: f64 },

    #[error("eigendecomposition failed: {0}")]
    Decomposition(String),

    #[error("unsupported optimizer: {0:?} (expected \"sgd\" or \"momentum\")")]
    UnsupportedOptimizer(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl LandscapeError {
    /// True for both ways the bound function can fail during sampling.
    pub fn is_evaluation_failure(&self) -> bool {
        matches!(
            self,
            LandscapeError::Function(_) | LandscapeError::NonFinite { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LandscapeError>;
