//! panel-report
//!
//! Report assembly: joins aggregator output with company-directory
//! lookups into the final report values consumed by the presentation
//! layer.
//!
//! Rules:
//! - display name falls back `trade_name` -> `abbreviation` ->
//!   `"Company {code}"`; name resolution is non-critical and never fails
//!   a report build
//! - each distinct company code is resolved once per build
//! - reports are plain owned values, never mutated after construction
//! - primary-fetch failures propagate; no placeholder numbers

mod assembler;
mod reports;

pub use assembler::{display_name, ReportAssembler};
pub use reports::*;
