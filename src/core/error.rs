//! Error types for quantasim.

use thiserror::Error;

/// Result type alias for quantasim operations.
pub type Result<T> = std::result::Result<T, QuantaError>;

/// Error types for the projection engine and its data layer.
#[derive(Error, Debug)]
pub enum QuantaError {
    /// Invalid parameter value.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Insufficient data for calculation.
    #[error("Insufficient data: need at least {required} elements, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// Empty data error.
    #[error("Empty data provided for {context}")]
    EmptyData { context: String },

    /// Transport failure talking to the market-data source.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed upstream payload.
    #[error("Failed to parse response: {message}")]
    Parse { message: String },

    /// Upstream answered, but with an error or no usable rows.
    #[error("Upstream error for {ticker}: {message}")]
    Upstream { ticker: String, message: String },

    /// Simulation was cancelled or ran past its deadline.
    #[error("Simulation cancelled after {completed} of {total} paths")]
    Cancelled { completed: usize, total: usize },
}

impl QuantaError {
    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    /// Create an empty data error.
    pub fn empty_data(context: impl Into<String>) -> Self {
        Self::EmptyData {
            context: context.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create an upstream error.
    pub fn upstream(ticker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            ticker: ticker.into(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "python")]
impl From<QuantaError> for pyo3::PyErr {
    fn from(err: QuantaError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
