//! Unauthenticated token introspection.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use panel_core::TokenClaims;

/// Decode the claim payload of a JWT without verifying its signature.
///
/// Returns `None` on any malformed structure (wrong segment count, bad
/// base64url, bad JSON); this is introspection, not verification, and it
/// never raises.
pub fn decode_token(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    // Some issuers pad the payload; base64url proper does not.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
