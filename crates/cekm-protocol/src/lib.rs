//! Confidential EKM Protocol
//!
//! Definitions shared by every party of the Confidential EKM secure session
//! protocol:
//!
//! - [`Operation`]: the seven protocol operations and their endpoint families
//! - [`messages`]: request/response schemas with their JSON wire encoding
//! - [`ProtocolConstants`]: attestation / teardown binding values and default ports
//!
//! Message payloads are opaque at this layer. Producing and checking
//! attestation evidence or wrapped keys happens elsewhere.

#![forbid(unsafe_code)]

pub mod constants;
pub mod messages;
pub mod operation;
pub mod wire;

pub use constants::{
    ProtocolConstants, ATTESTATION_PREFIX, END_SESSION_STRING, EXPORT_LABEL, GRPC_PORT, HTTP_PORT,
};
pub use messages::ProtocolRequest;
pub use operation::{EndpointFamily, Operation};
