//! Protocol operation catalogue
//!
//! Every request a client can issue against a Confidential EKM endpoint is one
//! of the seven [`Operation`]s below. Operations fall into two endpoint
//! families which determine how the request URL is formed from the key
//! resource URI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an operation's endpoint URL is derived from the key resource URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointFamily {
    /// Session establishment and teardown: the last two path segments of the
    /// resource URI are dropped before the suffix is appended.
    SessionLifecycle,
    /// Key operations: the suffix is appended to the resource URI unchanged.
    KeyOperation,
}

/// One of the seven Confidential EKM protocol operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Open a secure session (first TLS flight)
    BeginSession,
    /// Complete the tunnelled TLS handshake
    Handshake,
    /// Agree on the attestation evidence types
    NegotiateAttestation,
    /// Submit attestation evidence and activate the session
    Finalize,
    /// Tear the session down
    EndSession,
    /// Wrap key material under the session
    ConfidentialWrap,
    /// Unwrap key material under the session
    ConfidentialUnwrap,
}

impl Operation {
    /// All operations, in protocol order.
    pub const ALL: [Operation; 7] = [
        Operation::BeginSession,
        Operation::Handshake,
        Operation::NegotiateAttestation,
        Operation::Finalize,
        Operation::EndSession,
        Operation::ConfidentialWrap,
        Operation::ConfidentialUnwrap,
    ];

    /// Endpoint family the operation belongs to
    pub fn family(self) -> EndpointFamily {
        match self {
            Operation::BeginSession
            | Operation::Handshake
            | Operation::NegotiateAttestation
            | Operation::Finalize
            | Operation::EndSession => EndpointFamily::SessionLifecycle,
            Operation::ConfidentialWrap | Operation::ConfidentialUnwrap => {
                EndpointFamily::KeyOperation
            }
        }
    }

    /// Fixed suffix appended to the derived base URL
    pub fn path_suffix(self) -> &'static str {
        match self {
            Operation::BeginSession => "/session/beginsession",
            Operation::Handshake => "/session/handshake",
            Operation::NegotiateAttestation => "/session/negotiateattestation",
            Operation::Finalize => "/session/finalize",
            Operation::EndSession => "/session/endsession",
            Operation::ConfidentialWrap => ":confidentialwrap",
            Operation::ConfidentialUnwrap => ":confidentialunwrap",
        }
    }

    /// Stable name used in logs and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::BeginSession => "BeginSession",
            Operation::Handshake => "Handshake",
            Operation::NegotiateAttestation => "NegotiateAttestation",
            Operation::Finalize => "Finalize",
            Operation::EndSession => "EndSession",
            Operation::ConfidentialWrap => "ConfidentialWrap",
            Operation::ConfidentialUnwrap => "ConfidentialUnwrap",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
