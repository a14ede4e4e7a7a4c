//! Error types for sendit-client

use thiserror::Error;

/// Errors that can occur in the messaging client
///
/// Client-side rejections (`InvalidEmail`, `WeakPassword`, `EmptyMessage`,
/// `NotAuthenticated`) are detected before any network call is made.
/// `Provider` and `Store` carry the external service's message verbatim and
/// are never retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Email does not match the `local@domain.tld` shape
    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    /// Password below the identity provider's minimum length
    #[error("Password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },

    /// Message body is empty after trimming whitespace
    #[error("Message text must not be empty")]
    EmptyMessage,

    /// Operation attempted without a current account
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Identity provider rejected the operation
    #[error("Identity provider rejected {operation}: {reason}")]
    Provider { operation: String, reason: String },

    /// Document store write or query failed
    #[error("Document store rejected {operation}: {reason}")]
    Store { operation: String, reason: String },

    /// Transport-level connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Build a provider-rejected error for the named operation
    pub fn provider(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::Provider {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Build a store-rejected error for the named operation
    pub fn store(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::Store {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// True for rejections detected client-side, before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidEmail(_)
                | ClientError::WeakPassword { .. }
                | ClientError::EmptyMessage
                | ClientError::NotAuthenticated
        )
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
