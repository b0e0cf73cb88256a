//! Protocol binding constants shared by client and server
//!
//! These values bind attestation evidence and session teardown to the
//! tunnelled TLS session. They are consumed by the attestation and teardown
//! logic; the session client transports the resulting messages without
//! looking at them.

use serde::{Deserialize, Serialize};

/// Prefix of the transcript that attestation evidence is bound to.
pub const ATTESTATION_PREFIX: &str = "TLSAttestationV1";

/// Sentinel that is session-encrypted and sent in an EndSession request.
pub const END_SESSION_STRING: &str = "TLS Tunneled EndSessionRequest V1";

/// Label used to export keying material from the tunnelled TLS session.
pub const EXPORT_LABEL: &str = "EXPERIMENTAL Google Confidential Computing Client Attestation 1.0";

/// Default port of the gRPC session service.
pub const GRPC_PORT: u16 = 9754;

/// Default listening port of the HTTP to gRPC proxy.
pub const HTTP_PORT: u16 = 9755;

/// Immutable set of protocol binding values
///
/// Passed explicitly to the components that build attestation bindings or
/// teardown messages instead of being read from globals. `Default` yields the
/// published protocol values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConstants {
    /// Attestation transcript prefix
    pub attestation_prefix: String,
    /// End-session sentinel
    pub end_session_string: String,
    /// TLS key-export label
    pub export_label: String,
    /// Default gRPC session service port
    pub grpc_port: u16,
    /// Default HTTP proxy port
    pub http_port: u16,
}

impl Default for ProtocolConstants {
    fn default() -> Self {
        Self {
            attestation_prefix: ATTESTATION_PREFIX.to_string(),
            end_session_string: END_SESSION_STRING.to_string(),
            export_label: EXPORT_LABEL.to_string(),
            grpc_port: GRPC_PORT,
            http_port: HTTP_PORT,
        }
    }
}

impl ProtocolConstants {
    /// Attestation prefix as bytes, ready to be fed into a transcript hash
    pub fn attestation_prefix_bytes(&self) -> &[u8] {
        self.attestation_prefix.as_bytes()
    }

    /// End-session sentinel as bytes, ready to be session-encrypted
    pub fn end_session_bytes(&self) -> &[u8] {
        self.end_session_string.as_bytes()
    }
}
