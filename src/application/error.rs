use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::validation::ValidationErrors;
use crate::infra::http::TransportError;

/// Error surfaced by the domain client, the query cache and the bindings.
///
/// Cloneable so one failed fetch can be handed to every caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("query cache error: {0}")]
    Cache(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Domain(DomainError::Validation(errors))
    }
}

impl ApiError {
    pub fn cache(message: impl Into<String>) -> Self {
        ApiError::Cache(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Domain(err) => err.is_not_found(),
            ApiError::Transport(err) => err.is_not_found(),
            ApiError::Cache(_) => false,
        }
    }

    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            ApiError::Domain(DomainError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Whether a failed fetch may be retried. Domain errors never are.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Domain(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_detected_across_layers() {
        assert!(ApiError::from(DomainError::not_found("restaurant", 4)).is_not_found());
        assert!(
            ApiError::from(TransportError::Status {
                status: 404,
                message: "gone".into(),
            })
            .is_not_found()
        );
        assert!(!ApiError::cache("boom").is_not_found());
    }

    #[test]
    fn domain_errors_are_not_retried() {
        let validation = ApiError::from(ValidationErrors::single("price", "Price must be at least 1."));
        assert!(!validation.is_retryable());
        assert!(validation.validation().is_some());
        assert!(ApiError::from(TransportError::Network("reset".into())).is_retryable());
    }
}
