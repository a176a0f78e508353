//! Image cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Image cache error variants.
///
/// Cloneable so one failed fetch can be handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum CacheError {
    #[error("HTTP error! status: {status} {reason}")]
    Http { status: u16, reason: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("failed to create object handle: {message}")]
    Storage { message: String },

    #[error("image cache is already initialized")]
    AlreadyInitialized,

    #[error("internal cache error: {message}")]
    Internal { message: String },
}

impl CacheError {
    /// Creates HTTP status error.
    #[must_use]
    pub fn http(status: u16, reason: impl Into<String>) -> Self {
        Self::Http {
            status,
            reason: reason.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns whether the failure happened while talking to the server.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_message_includes_status() {
        let err = CacheError::http(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP error! status: 404 Not Found");
        assert!(err.is_network_error());
    }

    #[test]
    fn test_storage_is_not_network() {
        assert!(!CacheError::storage("disk full").is_network_error());
        assert!(!CacheError::AlreadyInitialized.is_network_error());
    }
}
