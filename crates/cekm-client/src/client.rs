//! Confidential EKM session protocol client
//!
//! [`ConfidentialEkmClient`] binds a key resource URI, an optional bearer
//! token and a pinned trust anchor set. Each protocol operation is one
//! independent round trip: derive the endpoint, send, decode.
//!
//! # Ordering is the caller's job
//!
//! The protocol implies a session state machine on the server
//! (not started → established → attested → finalized → active → ended).
//! This client neither tracks nor enforces it and keeps no state between
//! calls; session continuity lives in the opaque message fields. Callers must
//! invoke the operations in protocol order, or use
//! [`SessionTracker`](crate::session::SessionTracker) which rejects misordered
//! calls before they reach the network.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cekm_protocol::messages::{
    BeginSessionRequest, BeginSessionResponse, ConfidentialUnwrapRequest,
    ConfidentialUnwrapResponse, ConfidentialWrapRequest, ConfidentialWrapResponse,
    EndSessionRequest, EndSessionResponse, FinalizeRequest, FinalizeResponse, HandshakeRequest,
    HandshakeResponse, NegotiateAttestationRequest, NegotiateAttestationResponse,
};
use cekm_protocol::{Operation, ProtocolRequest};
use tracing::warn;

use crate::context::CallContext;
use crate::endpoint;
use crate::error::{BuildError, Result};
use crate::transport::HttpsTransport;
use crate::trust::TrustAnchors;

/// The seven Confidential EKM protocol operations
///
/// Implementations perform no content validation and no ordering checks.
#[async_trait]
pub trait ConfidentialEkm: Send + Sync {
    /// Open a secure session
    async fn begin_session(
        &self,
        ctx: &CallContext,
        request: &BeginSessionRequest,
    ) -> Result<BeginSessionResponse>;

    /// Continue the tunnelled TLS handshake
    async fn handshake(
        &self,
        ctx: &CallContext,
        request: &HandshakeRequest,
    ) -> Result<HandshakeResponse>;

    /// Agree on attestation evidence types
    async fn negotiate_attestation(
        &self,
        ctx: &CallContext,
        request: &NegotiateAttestationRequest,
    ) -> Result<NegotiateAttestationResponse>;

    /// Submit attestation evidence
    async fn finalize(
        &self,
        ctx: &CallContext,
        request: &FinalizeRequest,
    ) -> Result<FinalizeResponse>;

    /// Tear the session down
    async fn end_session(
        &self,
        ctx: &CallContext,
        request: &EndSessionRequest,
    ) -> Result<EndSessionResponse>;

    /// Wrap key material
    async fn confidential_wrap(
        &self,
        ctx: &CallContext,
        request: &ConfidentialWrapRequest,
    ) -> Result<ConfidentialWrapResponse>;

    /// Unwrap key material
    async fn confidential_unwrap(
        &self,
        ctx: &CallContext,
        request: &ConfidentialUnwrapRequest,
    ) -> Result<ConfidentialUnwrapResponse>;
}

/// HTTPS client for one key resource
///
/// Immutable after construction and cheap to clone, so it can be shared by
/// concurrent calls without locking.
#[derive(Clone)]
pub struct ConfidentialEkmClient {
    resource_uri: Arc<str>,
    transport: HttpsTransport,
}

impl ConfidentialEkmClient {
    /// Create a new builder for the key at `resource_uri`
    pub fn builder(resource_uri: impl Into<String>) -> ConfidentialEkmClientBuilder {
        ConfidentialEkmClientBuilder::new(resource_uri)
    }

    /// Build a client from its three identity parts
    pub fn new(
        resource_uri: impl Into<String>,
        auth_token: Option<String>,
        trust_anchors: TrustAnchors,
    ) -> std::result::Result<Self, BuildError> {
        let mut builder = Self::builder(resource_uri).trust_anchors(trust_anchors);
        if let Some(token) = auth_token {
            builder = builder.auth_token(token);
        }
        builder.build()
    }

    /// Key resource URI the client targets
    pub fn resource_uri(&self) -> &str {
        &self.resource_uri
    }

    /// Endpoint URL `operation` is sent to
    pub fn endpoint(&self, operation: Operation) -> String {
        endpoint::endpoint_url(&self.resource_uri, operation)
    }

    /// Underlying transport
    pub fn transport(&self) -> &HttpsTransport {
        &self.transport
    }

    /// Send any protocol request to its own endpoint
    pub async fn call<R>(&self, ctx: &CallContext, request: &R) -> Result<R::Response>
    where
        R: ProtocolRequest,
    {
        let url = self.endpoint(R::OPERATION);
        self.transport.send(ctx, R::OPERATION, &url, request).await
    }
}

impl fmt::Debug for ConfidentialEkmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfidentialEkmClient")
            .field("resource_uri", &self.resource_uri)
            .field("transport", &self.transport)
            .finish()
    }
}

#[async_trait]
impl ConfidentialEkm for ConfidentialEkmClient {
    async fn begin_session(
        &self,
        ctx: &CallContext,
        request: &BeginSessionRequest,
    ) -> Result<BeginSessionResponse> {
        self.call(ctx, request).await
    }

    async fn handshake(
        &self,
        ctx: &CallContext,
        request: &HandshakeRequest,
    ) -> Result<HandshakeResponse> {
        self.call(ctx, request).await
    }

    async fn negotiate_attestation(
        &self,
        ctx: &CallContext,
        request: &NegotiateAttestationRequest,
    ) -> Result<NegotiateAttestationResponse> {
        self.call(ctx, request).await
    }

    async fn finalize(
        &self,
        ctx: &CallContext,
        request: &FinalizeRequest,
    ) -> Result<FinalizeResponse> {
        self.call(ctx, request).await
    }

    async fn end_session(
        &self,
        ctx: &CallContext,
        request: &EndSessionRequest,
    ) -> Result<EndSessionResponse> {
        self.call(ctx, request).await
    }

    async fn confidential_wrap(
        &self,
        ctx: &CallContext,
        request: &ConfidentialWrapRequest,
    ) -> Result<ConfidentialWrapResponse> {
        self.call(ctx, request).await
    }

    async fn confidential_unwrap(
        &self,
        ctx: &CallContext,
        request: &ConfidentialUnwrapRequest,
    ) -> Result<ConfidentialUnwrapResponse> {
        self.call(ctx, request).await
    }
}

/// Builder for [`ConfidentialEkmClient`]
pub struct ConfidentialEkmClientBuilder {
    resource_uri: String,
    auth_token: Option<String>,
    trust_anchors: TrustAnchors,
    connect_timeout: Option<Duration>,
    allow_plain_http: bool,
}

impl fmt::Debug for ConfidentialEkmClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfidentialEkmClientBuilder")
            .field("resource_uri", &self.resource_uri)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("trust_anchors", &self.trust_anchors)
            .field("connect_timeout", &self.connect_timeout)
            .field("allow_plain_http", &self.allow_plain_http)
            .finish()
    }
}

impl ConfidentialEkmClientBuilder {
    /// Start a builder for the key at `resource_uri`
    pub fn new(resource_uri: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            auth_token: None,
            trust_anchors: TrustAnchors::new(),
            connect_timeout: None,
            allow_plain_http: false,
        }
    }

    /// Attach `Authorization: Bearer <token>` to every request
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Replace the trusted certificate authorities
    pub fn trust_anchors(mut self, anchors: TrustAnchors) -> Self {
        self.trust_anchors = anchors;
        self
    }

    /// Bound the TCP/TLS connect phase of each call
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Permit `http://` resource URIs
    ///
    /// Such requests carry no TLS and therefore no certificate pinning. Meant
    /// for local test servers only.
    pub fn allow_plain_http(mut self, allow: bool) -> Self {
        self.allow_plain_http = allow;
        self
    }

    /// Build the client
    pub fn build(self) -> std::result::Result<ConfidentialEkmClient, BuildError> {
        if !endpoint::has_full_session_base(&self.resource_uri) {
            warn!(
                resource_uri = %self.resource_uri,
                "resource URI has fewer than two path segments; session endpoints will be derived from a truncated base"
            );
        }
        let transport = HttpsTransport::new(
            &self.trust_anchors,
            self.auth_token,
            self.connect_timeout,
            self.allow_plain_http,
        )?;
        Ok(ConfidentialEkmClient {
            resource_uri: Arc::from(self.resource_uri),
            transport,
        })
    }
}
