//! Pinned HTTPS JSON transport
//!
//! [`HttpsTransport::send`] performs one POST round trip:
//!
//! 1. serialize the request as JSON
//! 2. build the POST (`Content-Type: application/json`, bearer token if set)
//! 3. execute it against a TLS stack that trusts only the pinned anchors
//! 4. require `200 OK`; any other status fails without decoding the body
//! 5. read and decode the body
//!
//! There is no retry. The exchange (steps 3–5 up to the decode) races against
//! the caller's [`CallContext`].

use std::fmt;
use std::time::Duration;

use cekm_protocol::Operation;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::context::CallContext;
use crate::error::{BuildError, ClientError, Result, Stage};
use crate::trust::TrustAnchors;

const JSON: &str = "application/json";

/// HTTPS transport bound to a pinned trust anchor set
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpsTransport {
    http: reqwest::Client,
    auth_token: Option<Zeroizing<String>>,
    allow_plain_http: bool,
}

impl HttpsTransport {
    /// Build a transport trusting only `anchors`
    ///
    /// Only `https` URLs are accepted unless `allow_plain_http` is set.
    pub fn new(
        anchors: &TrustAnchors,
        auth_token: Option<String>,
        connect_timeout: Option<Duration>,
        allow_plain_http: bool,
    ) -> std::result::Result<Self, BuildError> {
        let auth_token = auth_token.filter(|t| !t.is_empty()).map(Zeroizing::new);
        if let Some(token) = &auth_token {
            let header = Zeroizing::new(format!("Bearer {}", token.as_str()));
            HeaderValue::from_str(&header).map_err(|_| BuildError::InvalidToken)?;
        }

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .redirect(Policy::none())
            .https_only(!allow_plain_http)
            .user_agent(format!("cekm-client/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        for certificate in anchors.to_certificates()? {
            builder = builder.add_root_certificate(certificate);
        }
        let http = builder.build().map_err(BuildError::Transport)?;

        debug!(
            trust_anchors = anchors.len(),
            authorized = auth_token.is_some(),
            allow_plain_http,
            "HTTPS transport ready"
        );
        if allow_plain_http {
            warn!("plain HTTP allowed; requests to http:// URLs bypass certificate pinning");
        }
        Ok(Self {
            http,
            auth_token,
            allow_plain_http,
        })
    }

    /// Whether requests carry a bearer token
    pub fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Send `request` to `url` as `operation` and decode the answer
    pub async fn send<Req, Resp>(
        &self,
        ctx: &CallContext,
        operation: Operation,
        url: &str,
        request: &Req,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|source| ClientError::Serialization { operation, source })?;

        let http_request = self.build_request(ctx, operation, url, body)?;

        debug!(%operation, url, "sending request");
        let body = tokio::select! {
            biased;
            interrupt = ctx.done() => {
                warn!(%operation, url, ?interrupt, "call interrupted");
                return Err(ClientError::interrupted(operation, Stage::Transport, interrupt));
            }
            result = self.exchange(operation, url, http_request) => result?,
        };

        serde_json::from_slice(&body)
            .map_err(|source| ClientError::Deserialization { operation, source })
    }

    fn build_request(
        &self,
        ctx: &CallContext,
        operation: Operation,
        url: &str,
        body: Vec<u8>,
    ) -> Result<reqwest::Request> {
        if let Some(interrupt) = ctx.check() {
            return Err(ClientError::interrupted(
                operation,
                Stage::RequestConstruction,
                interrupt,
            ));
        }

        let construction = |reason: String| ClientError::RequestConstruction {
            operation,
            url: url.to_string(),
            reason,
        };
        let parsed = Url::parse(url).map_err(|e| construction(e.to_string()))?;
        if parsed.scheme() != "https" && !self.allow_plain_http {
            return Err(construction(format!(
                "scheme `{}` not allowed; HTTPS is required",
                parsed.scheme()
            )));
        }

        let mut builder = self
            .http
            .post(parsed)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(body);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token.as_str());
        }
        builder.build().map_err(|e| construction(e.to_string()))
    }

    async fn exchange(
        &self,
        operation: Operation,
        url: &str,
        request: reqwest::Request,
    ) -> Result<Vec<u8>> {
        let response = self.http.execute(request).await.map_err(|source| {
            warn!(%operation, url, error = %source, "HTTP call failed");
            ClientError::Transport {
                operation,
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%operation, url, %status, "non-OK status returned");
            return Err(ClientError::RemoteStatus {
                operation,
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::ResponseRead {
                operation,
                url: url.to_string(),
                source,
            })?;
        debug!(%operation, url, len = bytes.len(), "response received");
        Ok(bytes.to_vec())
    }
}

impl fmt::Debug for HttpsTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpsTransport")
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("allow_plain_http", &self.allow_plain_http)
            .finish_non_exhaustive()
    }
}
