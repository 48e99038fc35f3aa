//! Error types for the call panel core
//!
//! Components return [`ClientResult`]; the [`CallPanel`](crate::CallPanel)
//! handler boundary catches every error, logs it and turns it into status
//! text. Nothing propagates past the panel.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for client-core operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while driving the call panel
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Missing, malformed, expired or rejected access token
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Audio device access was denied and the configuration requires it
    #[error("Audio device permission denied: {reason}")]
    Permission { reason: String },

    /// A call-start or accept precondition does not hold
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// Accepting the pending incoming call failed
    #[error("Accept failed: {reason}")]
    Accept { reason: String },

    /// Rejecting the pending incoming call failed
    #[error("Reject failed: {reason}")]
    Reject { reason: String },

    /// Start, hold or resume failed
    #[error("{operation} failed: {reason}")]
    Operation {
        operation: CallOperation,
        reason: String,
    },

    /// Hanging up failed; the call is cleared locally regardless
    #[error("Hang up failed: {reason}")]
    Hangup { reason: String },

    /// The panel was assembled without a required collaborator
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ClientError {
    /// The SDK refused the credential
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth(AuthError::Rejected(reason.into()))
    }

    /// Create a permission error
    pub fn permission(reason: impl Into<String>) -> Self {
        Self::Permission {
            reason: reason.into(),
        }
    }

    /// Create an accept error
    pub fn accept(reason: impl Into<String>) -> Self {
        Self::Accept {
            reason: reason.into(),
        }
    }

    /// Create a reject error
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Reject {
            reason: reason.into(),
        }
    }

    /// Create an operation error for start, hold or resume
    pub fn operation(operation: CallOperation, reason: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            reason: reason.into(),
        }
    }

    /// Create a hang-up error
    pub fn hangup(reason: impl Into<String>) -> Self {
        Self::Hangup {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The bare failure message, without the category prefix.
    ///
    /// This is what the panel interpolates into status text such as
    /// `"Unable to hold call: {reason}"`.
    pub fn reason(&self) -> String {
        match self {
            Self::Auth(auth) => auth.to_string(),
            Self::Validation(validation) => validation.to_string(),
            Self::Permission { reason }
            | Self::Accept { reason }
            | Self::Reject { reason }
            | Self::Operation { reason, .. }
            | Self::Hangup { reason } => reason.clone(),
            Self::Configuration { message } => message.clone(),
        }
    }
}

/// Why an access token could not produce a session
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no access token was provided")]
    MissingToken,

    #[error("malformed access token: {0}")]
    MalformedToken(String),

    #[error("access token expired at {0}")]
    Expired(DateTime<Utc>),

    /// The SDK refused to create an agent for the credential
    #[error("{0}")]
    Rejected(String),
}

/// Preconditions checked before a call is started or adopted
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the call agent is not initialized")]
    NoSession,

    #[error("callee id is empty")]
    MissingCallee,

    #[error("a call is already in progress")]
    CallInProgress,
}

/// Call operations that fail closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallOperation {
    Start,
    Hold,
    Resume,
}

impl CallOperation {
    /// Lower-case verb used in status text
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Hold => "hold",
            Self::Resume => "resume",
        }
    }
}

impl std::fmt::Display for CallOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Hold => write!(f, "Hold"),
            Self::Resume => write!(f, "Resume"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strips_category_prefix() {
        let err = ClientError::operation(CallOperation::Hold, "media busy");
        assert_eq!(err.to_string(), "Hold failed: media busy");
        assert_eq!(err.reason(), "media busy");

        let err: ClientError = AuthError::MissingToken.into();
        assert_eq!(err.reason(), "no access token was provided");
    }

    #[test]
    fn validation_converts_into_client_error() {
        let err: ClientError = ValidationError::CallInProgress.into();
        assert_eq!(err, ClientError::Validation(ValidationError::CallInProgress));
        assert_eq!(err.reason(), "a call is already in progress");
    }
}
