//! Client errors
//!
//! Every failure of a protocol call is terminal for that call and maps to
//! exactly one [`ClientError`] variant naming the stage that failed. No
//! partially decoded response is ever returned alongside an error.

use std::path::PathBuf;

use cekm_protocol::Operation;
use reqwest::StatusCode;

use crate::context::Interrupt;

/// Result alias for protocol calls
pub type Result<T> = std::result::Result<T, ClientError>;

/// Stage of a round trip at which a call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Encoding the request message
    Serialization,
    /// Building the HTTP request
    RequestConstruction,
    /// Connecting, TLS handshake, or HTTP exchange
    Transport,
    /// Server answered with a status other than 200
    RemoteStatus,
    /// Reading the response body
    ResponseRead,
    /// Decoding the response message
    Deserialization,
}

/// Failure of a single protocol round trip
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request message could not be encoded
    #[error("{operation}: failed to serialize request: {source}")]
    Serialization {
        /// Operation being called
        operation: Operation,
        /// Encoder error
        source: serde_json::Error,
    },

    /// HTTP request could not be built (invalid URL)
    #[error("{operation}: cannot build request for {url}: {reason}")]
    RequestConstruction {
        /// Operation being called
        operation: Operation,
        /// Derived endpoint URL
        url: String,
        /// Why construction failed
        reason: String,
    },

    /// Connection, TLS or pinning failure
    #[error("{operation}: HTTP call to {url} failed: {source}")]
    Transport {
        /// Operation being called
        operation: Operation,
        /// Endpoint URL
        url: String,
        /// Underlying transport error
        source: reqwest::Error,
    },

    /// Server returned a non-200 status; the body was not decoded
    #[error("{operation}: non-OK status returned by {url}: {status}")]
    RemoteStatus {
        /// Operation being called
        operation: Operation,
        /// Endpoint URL
        url: String,
        /// Status the server answered with
        status: StatusCode,
    },

    /// Response body could not be read
    #[error("{operation}: failed to read response body from {url}: {source}")]
    ResponseRead {
        /// Operation being called
        operation: Operation,
        /// Endpoint URL
        url: String,
        /// Underlying transport error
        source: reqwest::Error,
    },

    /// Response body did not match the expected schema
    #[error("{operation}: failed to deserialize response: {source}")]
    Deserialization {
        /// Operation being called
        operation: Operation,
        /// Decoder error
        source: serde_json::Error,
    },

    /// Caller cancelled the call context
    #[error("{operation}: call cancelled")]
    Cancelled {
        /// Operation being called
        operation: Operation,
        /// Stage that was interrupted
        stage: Stage,
    },

    /// Call context deadline passed
    #[error("{operation}: deadline exceeded")]
    DeadlineExceeded {
        /// Operation being called
        operation: Operation,
        /// Stage that was interrupted
        stage: Stage,
    },
}

impl ClientError {
    pub(crate) fn interrupted(operation: Operation, stage: Stage, interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Cancelled => ClientError::Cancelled { operation, stage },
            Interrupt::DeadlineExceeded => ClientError::DeadlineExceeded { operation, stage },
        }
    }

    /// Operation whose call failed
    pub fn operation(&self) -> Operation {
        match self {
            ClientError::Serialization { operation, .. }
            | ClientError::RequestConstruction { operation, .. }
            | ClientError::Transport { operation, .. }
            | ClientError::RemoteStatus { operation, .. }
            | ClientError::ResponseRead { operation, .. }
            | ClientError::Deserialization { operation, .. }
            | ClientError::Cancelled { operation, .. }
            | ClientError::DeadlineExceeded { operation, .. } => *operation,
        }
    }

    /// Stage at which the call failed
    pub fn stage(&self) -> Stage {
        match self {
            ClientError::Serialization { .. } => Stage::Serialization,
            ClientError::RequestConstruction { .. } => Stage::RequestConstruction,
            ClientError::Transport { .. } => Stage::Transport,
            ClientError::RemoteStatus { .. } => Stage::RemoteStatus,
            ClientError::ResponseRead { .. } => Stage::ResponseRead,
            ClientError::Deserialization { .. } => Stage::Deserialization,
            ClientError::Cancelled { stage, .. } | ClientError::DeadlineExceeded { stage, .. } => {
                *stage
            }
        }
    }

    /// HTTP status for remote status errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::RemoteStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the call was stopped by its context
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            ClientError::Cancelled { .. } | ClientError::DeadlineExceeded { .. }
        )
    }
}

/// Failure to construct a client
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No certificate authority was supplied
    #[error("no trust anchors supplied; refusing to fall back to system roots")]
    NoTrustAnchors,

    /// PEM input held no certificate block
    #[error("PEM input contains no CERTIFICATE block")]
    NoCertificateInPem,

    /// PEM input is malformed (bad armour or base64)
    #[error("malformed PEM input: {source}")]
    InvalidPem {
        /// PEM decoder error
        source: rustls_pki_types::pem::Error,
    },

    /// Trust anchor file could not be read
    #[error("failed to read trust anchor {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// I/O error
        source: std::io::Error,
    },

    /// A certificate cannot serve as a trust anchor
    #[error("invalid trust anchor #{index}: {source}")]
    InvalidCertificate {
        /// Position of the certificate in the anchor set
        index: usize,
        /// Certificate parser error
        source: rustls::Error,
    },

    /// Authorization token cannot be carried in an HTTP header
    #[error("authorization token contains characters not allowed in an HTTP header")]
    InvalidToken,

    /// HTTPS transport could not be initialised
    #[error("failed to build HTTPS transport: {0}")]
    Transport(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_status_carries_the_status() {
        let err = ClientError::RemoteStatus {
            operation: Operation::Finalize,
            url: "https://host/v1/session/finalize".into(),
            status: StatusCode::FORBIDDEN,
        };
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.stage(), Stage::RemoteStatus);
        assert_eq!(err.operation(), Operation::Finalize);
        let msg = err.to_string();
        assert!(msg.contains("403 Forbidden"), "{msg}");
        assert!(msg.starts_with("Finalize:"), "{msg}");
    }

    #[test]
    fn interruption_keeps_the_stage() {
        let err = ClientError::interrupted(
            Operation::BeginSession,
            Stage::RequestConstruction,
            Interrupt::DeadlineExceeded,
        );
        assert!(err.is_cancellation());
        assert!(matches!(err, ClientError::DeadlineExceeded { .. }));
        assert_eq!(err.stage(), Stage::RequestConstruction);
    }

    #[test]
    fn deserialization_error_is_not_cancellation() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::Deserialization {
            operation: Operation::Handshake,
            source,
        };
        assert!(!err.is_cancellation());
        assert_eq!(err.status(), None);
    }
}
