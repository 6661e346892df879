//! Error types for utility functions.

use carhart_traits::ProviderError;

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),
}

impl From<UtilsError> for ProviderError {
    fn from(err: UtilsError) -> Self {
        match err {
            UtilsError::Polars(e) => Self::Unavailable(e.to_string()),
            other => Self::Invalid(other.to_string()),
        }
    }
}
