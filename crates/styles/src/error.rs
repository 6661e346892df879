//! Error types for style computations.

/// Errors that can occur while preparing factor inputs.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Math operation error.
    #[error("math error: {0}")]
    Math(#[from] carhart_math::MathError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
