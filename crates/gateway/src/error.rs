//! Error taxonomy for gateway operations.
//!
//! Network failures, GraphQL field errors, client-side validation, and
//! response-shape mismatches all surface as one `OperationError` so
//! controllers have a single boundary to absorb.

use thiserror::Error;

/// The backend reports expired or missing credentials only as a message
/// containing this substring. The rule is brittle and lives in exactly one
/// place: `OperationError::from_server_message`.
const AUTH_REQUIRED_MARKER: &str = "Authentication required";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Transport unreachable, or the server answered without a GraphQL body.
    #[error("network error: {message}")]
    Network { message: String },

    /// The server rejected the request for missing/expired credentials.
    #[error("authentication required: {message}")]
    AuthRequired { message: String },

    /// Client-side validation failure; no request was sent.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The response did not match the operation's declared result shape.
    #[error("schema mismatch in {operation}: {message}")]
    Schema { operation: String, message: String },

    /// Any other GraphQL field error.
    #[error("{message}")]
    Server { message: String },
}

impl OperationError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn schema(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Classify a GraphQL error message reported by the server. This is the
    /// single point of change for the auth-detection substring rule.
    pub fn from_server_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(AUTH_REQUIRED_MARKER) {
            Self::AuthRequired { message }
        } else {
            Self::Server { message }
        }
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired { .. })
    }

    /// Human-readable message carried by every variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::AuthRequired { message }
            | Self::Validation { message }
            | Self::Schema { message, .. }
            | Self::Server { message } => message,
        }
    }
}
