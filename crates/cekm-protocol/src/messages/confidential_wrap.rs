//! Key operation messages
//!
//! Wrap and unwrap requests ride inside an active session: the key material
//! is in the session-encrypted `tls_records`, the metadata names the key.

use serde::{Deserialize, Serialize};

use super::ProtocolRequest;
use crate::operation::Operation;
use crate::wire::base64_bytes;

/// Identifies the key a wrap or unwrap applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestMetadata {
    /// Resource path of the key
    #[serde(default, alias = "key_path", skip_serializing_if = "String::is_empty")]
    pub key_path: String,
    /// Prefix of the key URI when not implied by the path
    #[serde(default, alias = "key_uri_prefix", skip_serializing_if = "String::is_empty")]
    pub key_uri_prefix: String,
    /// AAD bound into the wrap
    #[serde(
        default,
        alias = "additional_authenticated_data",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub additional_authenticated_data: Vec<u8>,
}

/// Wraps key material sent through the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfidentialWrapRequest {
    /// Session-encrypted plaintext key material
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
    /// Key selection and AAD
    #[serde(default, alias = "request_metadata", skip_serializing_if = "Option::is_none")]
    pub request_metadata: Option<RequestMetadata>,
}

/// Wrapped key material, session-encrypted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfidentialWrapResponse {
    /// Session-encrypted wrapped blob
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

/// Unwraps a ciphertext sent through the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfidentialUnwrapRequest {
    /// Session-encrypted wrapped blob
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
    /// Key selection and AAD
    #[serde(default, alias = "request_metadata", skip_serializing_if = "Option::is_none")]
    pub request_metadata: Option<RequestMetadata>,
}

/// Unwrapped key material, session-encrypted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfidentialUnwrapResponse {
    /// Session-encrypted plaintext key material
    #[serde(
        default,
        alias = "tls_records",
        with = "base64_bytes",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tls_records: Vec<u8>,
}

impl ProtocolRequest for ConfidentialWrapRequest {
    type Response = ConfidentialWrapResponse;
    const OPERATION: Operation = Operation::ConfidentialWrap;
}

impl ProtocolRequest for ConfidentialUnwrapRequest {
    type Response = ConfidentialUnwrapResponse;
    const OPERATION: Operation = Operation::ConfidentialUnwrap;
}
