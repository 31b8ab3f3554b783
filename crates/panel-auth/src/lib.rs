//! panel-auth
//!
//! Bearer-credential lifecycle for the back-office panel: acquisition,
//! per-access-key caching, proactive renewal and invalidation.
//!
//! Architectural decisions:
//! - A cached token is usable only while its remaining lifetime exceeds
//!   the 30 s renewal buffer AND it was issued under the current access
//!   key. The key-mismatch check runs before any other check, so a key
//!   change can never reuse a cross-tenant token, even a time-valid one.
//! - The credential is mirrored to a key-value [`TokenStore`] for session
//!   continuity; mirror writes are best effort and never fail a login.
//! - Token introspection is unauthenticated payload decoding only; the
//!   signature is never verified here.
//! - Never log the access key or the token contents.

mod introspect;
mod manager;
mod store;

pub use introspect::decode_token;
pub use manager::{CredentialManager, DefaultEntitySource, FixedEntity, RENEWAL_BUFFER_SECS};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
