//! panel-client
//!
//! Backend HTTP surface of the panel: the bulk data endpoints behind the
//! protected namespace, and the company directory cache.
//!
//! Request policy:
//! - paths under `/PAINEL_OPERACAO` carry `Authorization: Bearer {token}`;
//!   everything else is unauthenticated
//! - bulk data fetches are bounded at 30 s, directory and token requests
//!   at 10 s; exceeding the bound is a network error, never a retry
//! - caches (credential, directory) are mutated only at synchronous
//!   points after an awaited response completes

mod client;
mod directory;

pub use client::{PanelClient, PROTECTED_NAMESPACE};
pub use directory::{CompanyDirectory, DIRECTORY_TTL_SECS, FALLBACK_ENTITY_CODE};
