//! panel-aggregate
//!
//! Pure aggregation over decoded rows: per-day retention, per-month
//! coalescing, per-company totals and grand totals with consistent
//! percentage semantics.
//!
//! Architectural decisions:
//! - Deterministic, pure logic. No IO. No clocks. No network.
//! - Integer sums only; floating percentages are computed once, at the
//!   edge, with a zero-denominator guard (never NaN, never infinite).
//! - Two rows for the same calendar month under different date-text
//!   formats always coalesce into a single group.
//! - Rows with unparseable dates are excluded from month grouping and
//!   recorded as diagnostics; they still count toward company and grand
//!   totals, which cover the entire row set.
//! - "Most recent" is the maximum parsed date, never iteration order.

mod dates;
mod registers;
mod reconciliation;
mod settlement;
mod types;

pub use dates::{parse_row_date, MonthKey};
pub use reconciliation::*;
pub use registers::*;
pub use settlement::*;
pub use types::*;
