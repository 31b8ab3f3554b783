//! Register-state (till-session) summarization.
//!
//! Register rows are a current-state snapshot per company, not a dated
//! series, so there is no month fold here: rows map to indicator records
//! with parsed oldest dates, sorted by company code.

use chrono::NaiveDate;
use serde::Serialize;

use panel_core::RawRow;

use crate::dates::parse_row_date;

/// Current till-session state for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterIndicator {
    pub company_code: i64,
    pub open_count: i64,
    /// Absent when no register is currently open, or when the wire date
    /// parsed in neither accepted form.
    pub oldest_open_date: Option<NaiveDate>,
    pub closed_count: i64,
    pub oldest_unconsolidated_date: Option<NaiveDate>,
    /// Placeholder pending real consolidation-time data upstream.
    pub avg_consolidation_minutes: i64,
}

/// Map register-state rows to indicators, sorted by company code.
pub fn summarize_registers(rows: &[RawRow]) -> Vec<RegisterIndicator> {
    let mut out: Vec<RegisterIndicator> = rows
        .iter()
        .filter_map(|row| {
            let RawRow::RegisterState {
                company_code,
                open_count,
                oldest_open_date,
                closed_count,
                oldest_unconsolidated_date,
            } = row
            else {
                return None;
            };
            Some(RegisterIndicator {
                company_code: *company_code,
                open_count: *open_count,
                oldest_open_date: oldest_open_date.as_deref().and_then(parse_row_date),
                closed_count: *closed_count,
                oldest_unconsolidated_date: parse_row_date(oldest_unconsolidated_date),
                avg_consolidation_minutes: 0,
            })
        })
        .collect();

    out.sort_by_key(|i| i.company_code);
    out
}
