//! Pinned certificate authorities
//!
//! The HTTPS transport trusts exactly the anchors collected here. Built-in and
//! system roots are never consulted, so a server whose chain does not end in
//! one of these anchors fails the TLS handshake.
//!
//! Every certificate is decoded to DER and checked as a trust anchor when it
//! is added, so a bad input is reported with its position in the set.

use std::fmt;
use std::path::Path;

use rustls::RootCertStore;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::CertificateDer;

use crate::error::BuildError;

/// Caller-supplied set of trusted certificate authorities
#[derive(Clone, Default)]
pub struct TrustAnchors {
    certificates: Vec<CertificateDer<'static>>,
}

impl TrustAnchors {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set built from a PEM bundle (one or more certificates)
    pub fn from_pem(pem: &[u8]) -> Result<Self, BuildError> {
        let mut anchors = Self::new();
        anchors.add_pem(pem)?;
        Ok(anchors)
    }

    /// Set built from a PEM or DER certificate file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let mut anchors = Self::new();
        anchors.add_file(path)?;
        Ok(anchors)
    }

    /// Add every `CERTIFICATE` section of a PEM bundle
    ///
    /// Other section kinds are skipped. Nothing is added unless every
    /// certificate in the bundle is valid.
    pub fn add_pem(&mut self, pem: &[u8]) -> Result<&mut Self, BuildError> {
        let certificates = parse_pem(pem)?;
        if certificates.is_empty() {
            return Err(BuildError::NoCertificateInPem);
        }
        self.push_all(certificates)
    }

    /// Add a single DER encoded certificate
    pub fn add_der(&mut self, der: impl Into<Vec<u8>>) -> Result<&mut Self, BuildError> {
        self.push_all(vec![CertificateDer::from(der.into())])
    }

    /// Add a certificate file; PEM bundles are read section by section,
    /// anything without a PEM certificate is taken as DER
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, BuildError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let certificates = parse_pem(&bytes)?;
        if certificates.is_empty() {
            self.add_der(bytes)
        } else {
            self.push_all(certificates)
        }
    }

    /// Merge another set into this one
    pub fn extend(&mut self, other: TrustAnchors) -> &mut Self {
        self.certificates.extend(other.certificates);
        self
    }

    /// Number of anchors
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    /// DER encodings of the anchors, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.certificates.iter().map(|certificate| certificate.as_ref())
    }

    fn push_all(
        &mut self,
        certificates: Vec<CertificateDer<'static>>,
    ) -> Result<&mut Self, BuildError> {
        let offset = self.certificates.len();
        for (position, certificate) in certificates.iter().enumerate() {
            RootCertStore::empty()
                .add(certificate.clone())
                .map_err(|source| BuildError::InvalidCertificate {
                    index: offset + position,
                    source,
                })?;
        }
        self.certificates.extend(certificates);
        Ok(self)
    }

    pub(crate) fn to_certificates(&self) -> Result<Vec<reqwest::Certificate>, BuildError> {
        if self.certificates.is_empty() {
            return Err(BuildError::NoTrustAnchors);
        }
        self.iter()
            .map(|der| reqwest::Certificate::from_der(der).map_err(BuildError::Transport))
            .collect()
    }
}

impl fmt::Debug for TrustAnchors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchors")
            .field("count", &self.certificates.len())
            .finish()
    }
}

fn parse_pem(bytes: &[u8]) -> Result<Vec<CertificateDer<'static>>, BuildError> {
    CertificateDer::pem_slice_iter(bytes)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| BuildError::InvalidPem { source })
}
