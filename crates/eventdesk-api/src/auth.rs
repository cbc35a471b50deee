use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::error::Error;

/// Role carried in the access token's `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// The subset of access-token claims the client relies on.
///
/// `sub` is the signed-in user's email: stable across token refreshes,
/// which makes it the cache-partitioning identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// The backend is the only party that trusts these claims; the client
/// only needs them for routing (role) and cache partitioning (sub).
pub fn decode_claims(token: &str) -> Result<Claims, Error> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::MalformedToken("expected three dot-separated segments".into()))?;

    // Some issuers pad their segments; the URL-safe engine rejects padding.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedToken(format!("payload is not valid claims JSON: {e}")))
}
