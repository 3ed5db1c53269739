//! Error types for a3s-dispatch

use thiserror::Error;

/// Errors that can occur in the dispatch system
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Handler cannot accept the event type it was subscribed to
    #[error("Handler '{handler}' cannot accept events of type '{event_type}'")]
    InvalidHandlerShape {
        handler: String,
        event_type: String,
    },

    /// Targeted mutation on a handler that is not subscribed to the event type
    #[error("Handler '{handler}' is not subscribed to '{event_type}'")]
    NotSubscribed {
        handler: String,
        event_type: String,
    },

    /// Priority could not be parsed
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    /// Registry lock was poisoned by a panicking writer
    #[error("Registry lock poisoned: {0}")]
    LockPoisoned(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DispatchError::NotSubscribed {
            handler: "on_message".to_string(),
            event_type: "MessageReceived".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Handler 'on_message' is not subscribed to 'MessageReceived'"
        );
    }

    #[test]
    fn test_serialization_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: DispatchError = parse.unwrap_err().into();
        assert!(matches!(err, DispatchError::Serialization(_)));
    }
}
