//! Error types for the Encora provider

use thiserror::Error;

/// Encora provider errors
///
/// These are the fatal outcomes of a fetch. Degraded outcomes (a non-success
/// status, exhausted rate-limit retries) are reported through
/// [`FetchCompletion`](crate::types::FetchCompletion) instead.
#[derive(Error, Debug)]
pub enum EncoraError {
    /// A configured or server-provided URL could not be used
    #[error("Invalid collection URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Transport failure from the HTTP bridge
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for Encora operations
pub type Result<T> = std::result::Result<T, EncoraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EncoraError::InvalidUrl {
            url: "nope".to_string(),
            message: "relative URL without a base".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid collection URL 'nope': relative URL without a base"
        );
    }

    #[test]
    fn test_bridge_error_conversion() {
        let bridge = bridge_traits::error::BridgeError::OperationFailed("timeout".to_string());
        let error: EncoraError = bridge.into();

        assert!(matches!(error, EncoraError::BridgeError(_)));
        assert_eq!(error.to_string(), "Bridge operation failed: timeout");
    }
}
