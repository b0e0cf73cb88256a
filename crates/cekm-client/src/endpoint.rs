//! Endpoint URL derivation
//!
//! Session lifecycle endpoints live beside the key collection: the last two
//! path segments of the key resource URI (collection and key id) are dropped
//! and the operation path is appended. Key operations address the key itself
//! with a `:verb` suffix.
//!
//! Derivation is a pure string function. A URI with fewer than two `/`
//! characters is truncated as far as possible instead of being rejected.

use cekm_protocol::{EndpointFamily, Operation};

/// Number of trailing path segments removed for session lifecycle endpoints.
pub const SESSION_SEGMENTS_STRIPPED: usize = 2;

/// Remove up to `count` trailing `/`-delimited segments from `uri`.
///
/// Stops early, without error, once no `/` is left.
pub fn strip_trailing_segments(uri: &str, count: usize) -> &str {
    let mut base = uri;
    for _ in 0..count {
        match base.rfind('/') {
            Some(index) => base = &base[..index],
            None => break,
        }
    }
    base
}

/// Base URL shared by all session lifecycle endpoints.
pub fn session_base(resource_uri: &str) -> &str {
    strip_trailing_segments(resource_uri, SESSION_SEGMENTS_STRIPPED)
}

/// Whether `resource_uri` has enough segments for a full session base.
pub fn has_full_session_base(resource_uri: &str) -> bool {
    resource_uri.matches('/').count() >= SESSION_SEGMENTS_STRIPPED
}

/// Derive the endpoint URL of `operation` for the key at `resource_uri`.
pub fn endpoint_url(resource_uri: &str, operation: Operation) -> String {
    let base = match operation.family() {
        EndpointFamily::SessionLifecycle => session_base(resource_uri),
        EndpointFamily::KeyOperation => resource_uri,
    };
    format!("{base}{}", operation.path_suffix())
}
