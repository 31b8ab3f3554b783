use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Parse a row date in either backend text form:
/// - `DD/MM/YYYY`
/// - `YYYY-MM-DD` (an appended `THH:MM:SS` suffix is tolerated)
///
/// Returns `None` for anything else; callers decide the skip policy.
pub fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let s = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Calendar-month grouping key.
///
/// `Ord` follows `(year, month)`, which is the same order as the numeric
/// sort key `year * 100 + month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Stable numeric sort key (`2026-03` -> `202603`).
    pub fn sort_key(&self) -> i64 {
        self.year as i64 * 100 + self.month as i64
    }

    /// Locale-independent label, zero padded: `"2026-03"`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Short display label: `"Mar/26"`. An out-of-range month is clamped
    /// into the calendar rather than panicking.
    pub fn display_label(&self) -> String {
        let abbrev = MONTH_ABBREV[self.month.clamp(1, 12) as usize - 1];
        format!("{}/{:02}", abbrev, self.year.rem_euclid(100))
    }
}
