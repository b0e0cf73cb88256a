//! Client configuration
//!
//! TOML file layout:
//!
//! ```toml
//! resource_uri = "https://ekm.example.com/v0/projects/p/keys/k"
//! auth_token = "..."                     # optional
//! trust_anchors = ["/etc/cekm/ca.pem"]   # PEM bundles or DER files
//! connect_timeout_secs = 10              # optional
//! allow_plain_http = false               # optional, local testing only
//! ```
//!
//! `CEKM_RESOURCE_URI` and `CEKM_AUTH_TOKEN` override the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::ConfidentialEkmClient;
use crate::error::BuildError;
use crate::trust::TrustAnchors;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "CEKM_";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// I/O error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("invalid config field {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Client construction failed
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Settings needed to construct a [`ConfidentialEkmClient`]
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Key resource URI
    #[serde(default)]
    pub resource_uri: String,

    /// Bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Certificate authority files to pin
    #[serde(default)]
    pub trust_anchors: Vec<PathBuf>,

    /// Connect timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    /// Accept `http://` resource URIs (no TLS, no pinning)
    #[serde(default)]
    pub allow_plain_http: bool,
}

impl ClientConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `CEKM_*` overrides from the process environment
    pub fn merge_with_env(&mut self) {
        self.merge_with_vars(std::env::vars());
    }

    /// Apply `CEKM_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "RESOURCE_URI" => self.resource_uri = value.into(),
                "AUTH_TOKEN" => {
                    let token = value.into();
                    self.auth_token = (!token.is_empty()).then_some(token);
                }
                _ => {}
            }
        }
    }

    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resource_uri.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "resource_uri",
                reason: "must not be empty".to_string(),
            });
        }
        if self.trust_anchors.is_empty() {
            return Err(ConfigError::Invalid {
                field: "trust_anchors",
                reason: "at least one certificate authority file is required".to_string(),
            });
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_secs",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Read the configured trust anchor files
    pub fn load_trust_anchors(&self) -> Result<TrustAnchors, ConfigError> {
        let mut anchors = TrustAnchors::new();
        for path in &self.trust_anchors {
            anchors.add_file(path)?;
        }
        Ok(anchors)
    }

    /// Validate, load anchors and build the client
    pub fn build_client(&self) -> Result<ConfidentialEkmClient, ConfigError> {
        self.validate()?;
        let mut builder = ConfidentialEkmClient::builder(self.resource_uri.clone())
            .trust_anchors(self.load_trust_anchors()?)
            .allow_plain_http(self.allow_plain_http);
        if let Some(token) = &self.auth_token {
            builder = builder.auth_token(token.clone());
        }
        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("resource_uri", &self.resource_uri)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("trust_anchors", &self.trust_anchors)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("allow_plain_http", &self.allow_plain_http)
            .finish()
    }
}
