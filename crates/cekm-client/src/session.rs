//! Caller-side session phase tracking
//!
//! [`ConfidentialEkmClient`](crate::ConfidentialEkmClient) is stateless.
//! [`SessionTracker`] wraps any [`ConfidentialEkm`] and follows one secure
//! session through its phases so that a misordered call is refused locally,
//! before a round trip is spent on a request the server would reject.
//!
//! ```text
//! NotStarted --BeginSession--> Initiated --Handshake--> HandshakeComplete
//!   --NegotiateAttestation--> AttestationNegotiated --Finalize--> Active
//! Active --ConfidentialWrap / ConfidentialUnwrap--> Active
//! Initiated | HandshakeComplete | AttestationNegotiated | Active --EndSession--> Ended
//! ```
//!
//! The phase only advances when the call succeeds.

use std::fmt;

use cekm_protocol::messages::{
    BeginSessionRequest, BeginSessionResponse, ConfidentialUnwrapRequest,
    ConfidentialUnwrapResponse, ConfidentialWrapRequest, ConfidentialWrapResponse,
    EndSessionRequest, EndSessionResponse, FinalizeRequest, FinalizeResponse, HandshakeRequest,
    HandshakeResponse, NegotiateAttestationRequest, NegotiateAttestationResponse,
};
use cekm_protocol::Operation;
use tracing::debug;

use crate::client::ConfidentialEkm;
use crate::context::CallContext;
use crate::error::ClientError;

/// Phase of one secure session as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No BeginSession yet
    NotStarted,
    /// BeginSession succeeded
    Initiated,
    /// Tunnelled TLS handshake done
    HandshakeComplete,
    /// Evidence types agreed
    AttestationNegotiated,
    /// Finalized; wrap and unwrap allowed
    Active,
    /// EndSession succeeded
    Ended,
}

impl SessionPhase {
    /// Whether `operation` may be issued in this phase
    pub fn permits(self, operation: Operation) -> bool {
        use SessionPhase::*;
        match operation {
            Operation::BeginSession => self == NotStarted,
            Operation::Handshake => self == Initiated,
            Operation::NegotiateAttestation => self == HandshakeComplete,
            Operation::Finalize => self == AttestationNegotiated,
            Operation::ConfidentialWrap | Operation::ConfidentialUnwrap => self == Active,
            Operation::EndSession => matches!(
                self,
                Initiated | HandshakeComplete | AttestationNegotiated | Active
            ),
        }
    }

    /// Phase reached after `operation` succeeds
    pub fn after(self, operation: Operation) -> SessionPhase {
        match operation {
            Operation::BeginSession => SessionPhase::Initiated,
            Operation::Handshake => SessionPhase::HandshakeComplete,
            Operation::NegotiateAttestation => SessionPhase::AttestationNegotiated,
            Operation::Finalize => SessionPhase::Active,
            Operation::ConfidentialWrap | Operation::ConfidentialUnwrap => self,
            Operation::EndSession => SessionPhase::Ended,
        }
    }

    /// Stable name used in logs and error messages
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "not started",
            SessionPhase::Initiated => "initiated",
            SessionPhase::HandshakeComplete => "handshake complete",
            SessionPhase::AttestationNegotiated => "attestation negotiated",
            SessionPhase::Active => "active",
            SessionPhase::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session tracker errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Operation not allowed in the current phase; nothing was sent
    #[error("{operation} is not permitted while the session is {phase}")]
    OutOfOrder {
        /// Refused operation
        operation: Operation,
        /// Phase at the time of the call
        phase: SessionPhase,
    },

    /// The round trip itself failed; the phase is unchanged
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Follows one secure session over a [`ConfidentialEkm`] client
#[derive(Debug)]
pub struct SessionTracker<C> {
    client: C,
    phase: SessionPhase,
    session_context: Option<Vec<u8>>,
}

impl<C: ConfidentialEkm> SessionTracker<C> {
    /// Start tracking a fresh session
    pub fn new(client: C) -> Self {
        Self {
            client,
            phase: SessionPhase::NotStarted,
            session_context: None,
        }
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Opaque session context returned by BeginSession
    pub fn session_context(&self) -> Option<&[u8]> {
        self.session_context.as_deref()
    }

    /// Wrapped client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Stop tracking and return the client
    pub fn into_inner(self) -> C {
        self.client
    }

    fn admit(&self, operation: Operation) -> Result<(), SessionError> {
        if self.phase.permits(operation) {
            Ok(())
        } else {
            debug!(%operation, phase = %self.phase, "refusing out-of-order call");
            Err(SessionError::OutOfOrder {
                operation,
                phase: self.phase,
            })
        }
    }

    fn advance(&mut self, operation: Operation) {
        let next = self.phase.after(operation);
        if next != self.phase {
            debug!(%operation, from = %self.phase, to = %next, "session phase advanced");
        }
        self.phase = next;
    }

    /// BeginSession; records the returned session context
    pub async fn begin_session(
        &mut self,
        ctx: &CallContext,
        request: &BeginSessionRequest,
    ) -> Result<BeginSessionResponse, SessionError> {
        self.admit(Operation::BeginSession)?;
        let response = self.client.begin_session(ctx, request).await?;
        self.session_context = Some(response.session_context.clone());
        self.advance(Operation::BeginSession);
        Ok(response)
    }

    /// Handshake
    pub async fn handshake(
        &mut self,
        ctx: &CallContext,
        request: &HandshakeRequest,
    ) -> Result<HandshakeResponse, SessionError> {
        self.admit(Operation::Handshake)?;
        let response = self.client.handshake(ctx, request).await?;
        self.advance(Operation::Handshake);
        Ok(response)
    }

    /// NegotiateAttestation
    pub async fn negotiate_attestation(
        &mut self,
        ctx: &CallContext,
        request: &NegotiateAttestationRequest,
    ) -> Result<NegotiateAttestationResponse, SessionError> {
        self.admit(Operation::NegotiateAttestation)?;
        let response = self.client.negotiate_attestation(ctx, request).await?;
        self.advance(Operation::NegotiateAttestation);
        Ok(response)
    }

    /// Finalize
    pub async fn finalize(
        &mut self,
        ctx: &CallContext,
        request: &FinalizeRequest,
    ) -> Result<FinalizeResponse, SessionError> {
        self.admit(Operation::Finalize)?;
        let response = self.client.finalize(ctx, request).await?;
        self.advance(Operation::Finalize);
        Ok(response)
    }

    /// ConfidentialWrap; requires an active session
    pub async fn confidential_wrap(
        &mut self,
        ctx: &CallContext,
        request: &ConfidentialWrapRequest,
    ) -> Result<ConfidentialWrapResponse, SessionError> {
        self.admit(Operation::ConfidentialWrap)?;
        let response = self.client.confidential_wrap(ctx, request).await?;
        self.advance(Operation::ConfidentialWrap);
        Ok(response)
    }

    /// ConfidentialUnwrap; requires an active session
    pub async fn confidential_unwrap(
        &mut self,
        ctx: &CallContext,
        request: &ConfidentialUnwrapRequest,
    ) -> Result<ConfidentialUnwrapResponse, SessionError> {
        self.admit(Operation::ConfidentialUnwrap)?;
        let response = self.client.confidential_unwrap(ctx, request).await?;
        self.advance(Operation::ConfidentialUnwrap);
        Ok(response)
    }

    /// EndSession
    pub async fn end_session(
        &mut self,
        ctx: &CallContext,
        request: &EndSessionRequest,
    ) -> Result<EndSessionResponse, SessionError> {
        self.admit(Operation::EndSession)?;
        let response = self.client.end_session(ctx, request).await?;
        self.advance(Operation::EndSession);
        Ok(response)
    }
}
