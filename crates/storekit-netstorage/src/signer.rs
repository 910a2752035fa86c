//! NetStorage request signer
//!
//! Every request carries three headers:
//! - `X-Akamai-ACS-Action`: the rendered action descriptor
//! - `X-Akamai-ACS-Auth-Data`: version, placeholder addresses, timestamp, id, key name
//! - `X-Akamai-ACS-Auth-Sign`: base64 HMAC-SHA256 over auth-data, path and action
//!
//! The secret never leaves the process; the server recomputes the
//! signature from the same inputs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::RequestBuilder;
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

pub const ACTION_HEADER: &str = "X-Akamai-ACS-Action";
pub const AUTH_DATA_HEADER: &str = "X-Akamai-ACS-Auth-Data";
pub const AUTH_SIGN_HEADER: &str = "X-Akamai-ACS-Auth-Sign";

/// Signature protocol version sent in auth-data
const AUTH_VERSION: u32 = 5;

/// Placeholder for the two reserved address fields
const ZERO_ADDRESS: &str = "0.0.0.0";

/// Header values for one signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub action: String,
    pub auth_data: String,
    pub auth_sign: String,
}

impl AuthHeaders {
    /// Attach the three headers to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(ACTION_HEADER, &self.action)
            .header(AUTH_DATA_HEADER, &self.auth_data)
            .header(AUTH_SIGN_HEADER, &self.auth_sign)
    }
}

/// Derives per-request signatures from a key name and shared secret
#[derive(Clone)]
pub struct Signer {
    key_name: String,
    secret: String,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("key_name", &self.key_name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Signer {
    pub fn new(key_name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            secret: secret.into(),
        }
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Build the auth-data header value.
    ///
    /// `id` must be the canonical resource path; the server checks it.
    pub fn auth_data(&self, timestamp: i64, id: &str) -> String {
        format!(
            "{}, {}, {}, {}, {}, {}",
            AUTH_VERSION, ZERO_ADDRESS, ZERO_ADDRESS, timestamp, id, self.key_name
        )
    }

    /// Compute the signature over auth-data, path and action
    pub fn signature(&self, auth_data: &str, path: &str, action: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(auth_data.as_bytes());
        mac.update(b"/");
        mac.update(path.as_bytes());
        mac.update(b"\nx-akamai-acs-action:");
        mac.update(action.as_bytes());
        mac.update(b"\n");
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Produce all three header values for one request
    pub fn sign(&self, action: &str, path: &str, id: &str, timestamp: i64) -> AuthHeaders {
        let auth_data = self.auth_data(timestamp, id);
        let auth_sign = self.signature(&auth_data, path, action);
        AuthHeaders {
            action: action.to_string(),
            auth_data,
            auth_sign,
        }
    }
}
