//! Request/response schemas for the seven protocol operations
//!
//! Field structure is owned by the protocol definition. The JSON encoding
//! follows the protobuf JSON mapping: lowerCamelCase names, base64 bytes,
//! empty fields omitted.

pub mod confidential_wrap;
pub mod secure_session;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::operation::Operation;

pub use confidential_wrap::{
    ConfidentialUnwrapRequest, ConfidentialUnwrapResponse, ConfidentialWrapRequest,
    ConfidentialWrapResponse, RequestMetadata,
};
pub use secure_session::{
    BeginSessionRequest, BeginSessionResponse, EndSessionRequest, EndSessionResponse,
    FinalizeRequest, FinalizeResponse, HandshakeRequest, HandshakeResponse,
    NegotiateAttestationRequest, NegotiateAttestationResponse,
};

/// A request message statically bound to its operation and response schema
pub trait ProtocolRequest: Serialize + Send + Sync {
    /// Schema the server answers with
    type Response: DeserializeOwned + Send;

    /// Operation this request is sent as
    const OPERATION: Operation;
}
