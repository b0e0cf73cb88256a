//! Secure session lifecycle messages
//!
//! Carry the tunnelled TLS records and attestation payloads that establish,
//! attest and tear down a session. All byte fields are opaque here.

use serde::{Deserialize, Serialize};

use super::ProtocolRequest;
use crate::operation::Operation;
use crate::wire::base64_bytes;

/// Opens a session with the client's first TLS flight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BeginSessionRequest {
    /// Client TLS records (ClientHello)
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

/// Session handle plus the server's first TLS flight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BeginSessionResponse {
    /// Server-issued session handle, echoed in later lifecycle requests
    #[serde(
        default,
        alias = "session_context",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub session_context: Vec<u8>,
    /// Server TLS records
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

/// Continues the tunnelled TLS handshake
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HandshakeRequest {
    /// Handle from `BeginSessionResponse`
    #[serde(
        default,
        alias = "session_context",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub session_context: Vec<u8>,
    /// Client TLS records for this handshake round
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

/// Server handshake flight
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HandshakeResponse {
    /// Server TLS records
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

/// Offers the evidence types the client can produce
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NegotiateAttestationRequest {
    /// Handle from `BeginSessionResponse`
    #[serde(
        default,
        alias = "session_context",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub session_context: Vec<u8>,
    /// Session-encrypted list of offered evidence types
    #[serde(
        default,
        alias = "offered_evidence_types_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub offered_evidence_types_records: Vec<u8>,
}

/// Evidence types the server asks for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NegotiateAttestationResponse {
    /// Session-encrypted list of evidence types the server requires
    #[serde(
        default,
        alias = "required_evidence_types_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub required_evidence_types_records: Vec<u8>,
}

/// Delivers attestation evidence bound to the tunnelled session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FinalizeRequest {
    /// Handle from `BeginSessionResponse`
    #[serde(
        default,
        alias = "session_context",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub session_context: Vec<u8>,
    /// Session-encrypted attestation evidence
    #[serde(
        default,
        alias = "attestation_evidence_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attestation_evidence_records: Vec<u8>,
}

/// Empty acknowledgement of accepted evidence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinalizeResponse {}

/// Tears the session down; `tls_records` carries the encrypted sentinel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EndSessionRequest {
    /// Handle of the session to close
    #[serde(
        default,
        alias = "session_context",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub session_context: Vec<u8>,
    /// Session-encrypted end-of-session sentinel
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

/// Empty acknowledgement of session teardown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndSessionResponse {}

impl ProtocolRequest for BeginSessionRequest {
    type Response = BeginSessionResponse;
    const OPERATION: Operation = Operation::BeginSession;
}

impl ProtocolRequest for HandshakeRequest {
    type Response = HandshakeResponse;
    const OPERATION: Operation = Operation::Handshake;
}

impl ProtocolRequest for NegotiateAttestationRequest {
    type Response = NegotiateAttestationResponse;
    const OPERATION: Operation = Operation::NegotiateAttestation;
}

impl ProtocolRequest for FinalizeRequest {
    type Response = FinalizeResponse;
    const OPERATION: Operation = Operation::Finalize;
}

impl ProtocolRequest for EndSessionRequest {
    type Response = EndSessionResponse;
    const OPERATION: Operation = Operation::EndSession;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_camel_case_and_base64() {
        let req = HandshakeRequest {
            session_context: b"ctx".to_vec(),
            tls_records: vec![0xfb, 0xff],
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "sessionContext": "Y3R4", "tlsRecords": "+/8=" }));
    }

    #[test]
    fn empty_fields_are_omitted() {
        let value = serde_json::to_value(BeginSessionRequest::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn response_accepts_snake_case_and_missing_fields() {
        let resp: BeginSessionResponse =
            serde_json::from_str(r#"{"session_context":"Y3R4"}"#).unwrap();
        assert_eq!(resp.session_context, b"ctx");
        assert!(resp.tls_records.is_empty());
    }

    #[test]
    fn response_rejects_unknown_fields() {
        assert!(serde_json::from_str::<FinalizeResponse>(r#"{"unexpected":1}"#).is_err());
        assert!(serde_json::from_str::<FinalizeResponse>("{}").is_ok());
    }
}
