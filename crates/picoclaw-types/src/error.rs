//! Error types for the PicoClaw decision core.
//!
//! Provides [`PicoClawError`] as the top-level error type. Decision
//! functions (routing, authorization, audit, guardrails) are total and
//! never return errors; only the runtime boundary produces values of
//! this type.

use thiserror::Error;

/// Top-level error type for the decision core.
///
/// Variants distinguish transport-level failures (which keep the core
/// alive and become JSON-RPC error responses) from fatal I/O (which
/// terminates the process). Callback failures are recovered into data
/// by the agent loop and never escape a request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PicoClawError {
    /// The peer violated the framing or JSON-RPC protocol.
    #[error("protocol error: {message}")]
    Protocol {
        /// What was malformed.
        message: String,
    },

    /// A request carried structurally valid but semantically bad params.
    #[error("validation error: {reason}")]
    Validation {
        /// What failed validation.
        reason: String,
    },

    /// The shell answered a callback with a JSON-RPC error or an
    /// unparseable result.
    #[error("callback '{method}' failed: {message}")]
    Callback {
        /// The callback method that failed (`llm_call` or `execute_tool`).
        method: String,
        /// Shell-supplied failure detail.
        message: String,
    },

    /// Underlying I/O error on the stdio transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PicoClawError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_display() {
        let err = PicoClawError::Protocol {
            message: "missing Content-Length header".into(),
        };
        assert_eq!(
            err.to_string(),
            "protocol error: missing Content-Length header"
        );
    }

    #[test]
    fn callback_error_display() {
        let err = PicoClawError::Callback {
            method: "llm_call".into(),
            message: "provider unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "callback 'llm_call' failed: provider unavailable"
        );
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed");
        let err: PicoClawError = io_err.into();
        assert!(matches!(err, PicoClawError::Io(_)));
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{nope}}").unwrap_err();
        let err: PicoClawError = json_err.into();
        assert!(matches!(err, PicoClawError::Json(_)));
    }

    #[test]
    fn result_alias_works() {
        fn ok_fn() -> Result<u32> {
            Ok(7)
        }
        assert_eq!(ok_fn().unwrap(), 7);
    }
}
