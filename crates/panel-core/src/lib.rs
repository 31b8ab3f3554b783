//! panel-core
//!
//! Shared domain types and the error taxonomy for the back-office panel
//! workspace.
//!
//! This crate owns:
//! - the tagged row variants produced by the tabular decoder
//! - the company directory record (wire-faithful field mapping)
//! - the persisted credential shape mirrored by the token store
//! - the unauthenticated token-claim structure
//! - [`PanelError`], the single error enum crossing crate boundaries
//!
//! It does **not** perform IO, aggregation, or decoding.

mod error;
mod types;

pub use error::PanelError;
pub use types::*;
