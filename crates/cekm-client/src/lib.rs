//! Confidential EKM Client
//!
//! HTTPS client for the Confidential EKM secure session protocol. A client is
//! bound to one key resource URI, an optional bearer token and a pinned set of
//! certificate authorities, and exposes the seven protocol operations as
//! independent JSON-over-HTTPS round trips:
//!
//! | Operation            | Endpoint                                   |
//! |----------------------|--------------------------------------------|
//! | BeginSession         | `<base>/session/beginsession`              |
//! | Handshake            | `<base>/session/handshake`                 |
//! | NegotiateAttestation | `<base>/session/negotiateattestation`      |
//! | Finalize             | `<base>/session/finalize`                  |
//! | EndSession           | `<base>/session/endsession`                |
//! | ConfidentialWrap     | `<resource_uri>:confidentialwrap`          |
//! | ConfidentialUnwrap   | `<resource_uri>:confidentialunwrap`        |
//!
//! `<base>` is the resource URI with its last two path segments removed.
//!
//! ```no_run
//! use cekm_client::{CallContext, ConfidentialEkm, ConfidentialEkmClient, TrustAnchors};
//! use cekm_client::protocol::messages::BeginSessionRequest;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ConfidentialEkmClient::builder("https://ekm.example.com/v0/projects/p/keys/k")
//!     .auth_token("token")
//!     .trust_anchors(TrustAnchors::from_file("/etc/cekm/ca.pem")?)
//!     .build()?;
//!
//! let ctx = CallContext::with_timeout(std::time::Duration::from_secs(10));
//! let response = client
//!     .begin_session(&ctx, &BeginSessionRequest { tls_records: b"client hello".to_vec() })
//!     .await?;
//! # let _ = response;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod session;
pub mod transport;
pub mod trust;

pub use cekm_protocol as protocol;

pub use client::{ConfidentialEkm, ConfidentialEkmClient, ConfidentialEkmClientBuilder};
pub use config::{ClientConfig, ConfigError};
pub use context::{CallContext, CancelHandle, Interrupt};
pub use error::{BuildError, ClientError, Result, Stage};
pub use session::{SessionError, SessionPhase, SessionTracker};
pub use transport::HttpsTransport;
pub use trust::TrustAnchors;
