//! Bridge error types.

use thiserror::Error;

/// Errors from command bridge operations.
///
/// Cloneable so a single failed connection attempt can be handed to every
/// caller that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The websocket connection could not be established.
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect {
        /// The endpoint that was dialed.
        endpoint: String,
        /// Why the attempt failed.
        reason: String,
    },

    /// The connection was closed while the request was outstanding.
    #[error("connection closed")]
    ConnectionClosed,

    /// No correlated reply arrived before the timeout ceiling.
    #[error("request timed out after {millis} ms: {command}")]
    Timeout {
        /// The command that timed out.
        command: String,
        /// The ceiling that elapsed, in milliseconds.
        millis: u64,
    },

    /// Writing a frame to the socket failed.
    #[error("send failed: {0}")]
    Send(String),

    /// An inbound frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Command arguments could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The remote replied with something the caller cannot use.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_connect_display() {
        let err = BridgeError::Connect {
            endpoint: "ws://localhost:10112/".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to connect to ws://localhost:10112/: connection refused"
        );
    }

    #[test]
    fn error_connection_closed_display() {
        assert_eq!(BridgeError::ConnectionClosed.to_string(), "connection closed");
    }

    #[test]
    fn error_timeout_display() {
        let err = BridgeError::Timeout {
            command: "script::debug::resume".into(),
            millis: 10_000,
        };
        assert_eq!(
            err.to_string(),
            "request timed out after 10000 ms: script::debug::resume"
        );
    }

    #[test]
    fn error_send_display() {
        let err = BridgeError::Send("broken pipe".into());
        assert_eq!(err.to_string(), "send failed: broken pipe");
    }

    #[test]
    fn error_decode_display() {
        let err = BridgeError::Decode("truncated document".into());
        assert_eq!(err.to_string(), "decode error: truncated document");
    }

    #[test]
    fn error_invalid_response_display() {
        let err = BridgeError::InvalidResponse("missing callstack".into());
        assert_eq!(err.to_string(), "invalid response: missing callstack");
    }

    #[test]
    fn error_clone_is_equal() {
        let err = BridgeError::Serialization("args must be an object".into());
        assert_eq!(err.clone(), err);
    }
}
