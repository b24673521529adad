//! Error types for the catalog engine.

use thiserror::Error;

use crate::client::ClientError;

/// Unified error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Backend call failed (full-collection load failures surface this).
    #[error("Backend error: {0}")]
    Backend(#[from] ClientError),

    /// Local validation rejected the action before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A destructive bulk action needs explicit confirmation first.
    #[error("Confirmation required to delete {0} monitored author(s)")]
    ConfirmationRequired(usize),
}

impl CatalogError {
    /// Create a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::validation("no target folder selected");
        assert_eq!(err.to_string(), "Validation error: no target folder selected");

        let err = CatalogError::ConfirmationRequired(3);
        assert_eq!(
            err.to_string(),
            "Confirmation required to delete 3 monitored author(s)"
        );
    }

    #[test]
    fn test_client_error_conversion() {
        let err: CatalogError = ClientError::api(404, "gone").into();
        assert!(matches!(err, CatalogError::Backend(_)));
    }
}
