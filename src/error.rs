//! Error types for the image analysis engine

use std::fmt;

/// Errors that can occur during image analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Pixel buffer is unusable (zero dimensions or wrong length)
    InvalidBuffer(String),

    /// Invalid input parameters or configuration
    InvalidInput(String),

    /// Numerical error (NaN or out-of-range feature value)
    NumericalError(String),

    /// Analysis was cancelled or superseded before it finished
    Cancelled,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidBuffer(msg) => write!(f, "Invalid buffer: {}", msg),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            AnalysisError::Cancelled => write!(f, "Analysis cancelled"),
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AnalysisError::InvalidBuffer("zero width".to_string());
        assert_eq!(err.to_string(), "Invalid buffer: zero width");
        assert_eq!(AnalysisError::Cancelled.to_string(), "Analysis cancelled");
    }
}
