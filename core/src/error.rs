//! Error types for an HTTP call invocation.
//!
//! # Design
//! Only two conditions can stop the enclosing build: a transport failure that
//! survived every retry attempt, and a received 4xx/5xx status. Both live in
//! `HttpCallError` and are only raised when `failOnError` is set.
//!
//! Extraction problems are split into a "not found" class and a "malformed"
//! class. Neither ever escapes the extractor's dispatch loop; they are logged
//! at warning or error level and the property is left unset.

use thiserror::Error;

/// Broad cause of a failed transport attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established (refused, DNS, TLS).
    Connect,
    /// The attempt ran past its per-attempt timeout.
    Timeout,
    /// The delay before the attempt was interrupted.
    Interrupted,
    /// The request could not be formed (bad URL, bad header).
    InvalidRequest,
    /// Any other I/O failure while exchanging the request.
    Io,
}

/// A single attempt failed to exchange a request and response at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Build-fatal outcomes of an invocation.
#[derive(Debug, Error)]
pub enum HttpCallError {
    /// Every permitted attempt failed at the transport level.
    #[error("HTTP call failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The server answered with a 4xx or 5xx status.
    #[error("HTTP request failed with status: {status}")]
    HttpStatus { status: u16 },
}

/// Why a single extraction rule produced no property.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("JSONPath '{path}' not found in response")]
    PathNotFound { path: String },

    #[error("Pattern '{pattern}' not found in response")]
    NoMatch { pattern: String },

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid JSONPath '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl ExtractError {
    /// True when the input was well-formed but simply held no match.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExtractError::PathNotFound { .. } | ExtractError::NoMatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_retries_message_names_attempts_and_cause() {
        let err = HttpCallError::RetriesExhausted {
            attempts: 3,
            source: TransportError::new(TransportErrorKind::Connect, "connection refused"),
        };
        assert_eq!(
            err.to_string(),
            "HTTP call failed after 3 attempts: connection refused"
        );
    }

    #[test]
    fn status_message_names_status() {
        let err = HttpCallError::HttpStatus { status: 503 };
        assert_eq!(err.to_string(), "HTTP request failed with status: 503");
    }

    #[test]
    fn not_found_class_is_distinguished_from_malformed() {
        assert!(ExtractError::NoMatch {
            pattern: "x".to_string()
        }
        .is_not_found());
        assert!(ExtractError::PathNotFound {
            path: "$.x".to_string()
        }
        .is_not_found());
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ExtractError::from(bad_json).is_not_found());
    }
}
