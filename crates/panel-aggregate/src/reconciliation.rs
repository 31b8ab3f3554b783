//! Reconciliation (bank-statement matching) aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use panel_core::RawRow;

use crate::dates::{parse_row_date, MonthKey};
use crate::types::{percentage, SkippedRow};

/// One calendar month of matched / unmatched counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationMonth {
    pub key: MonthKey,
    /// Locale-independent `"YYYY-MM"` label.
    pub label: String,
    /// Short presentation label (`"Mar/26"`).
    pub display_label: String,
    pub matched: i64,
    pub unmatched: i64,
    /// `matched + unmatched` — the percentage denominator for the month.
    pub total: i64,
    pub percentage: f64,
}

/// Totals for one company across the entire row set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationCompany {
    pub company_code: i64,
    pub record_count: i64,
    pub matched: i64,
    pub unmatched: i64,
    pub percentage: f64,
    /// Maximum parsed row date for the company, when any date parsed.
    pub last_update: Option<NaiveDate>,
}

/// Overall totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationGrand {
    pub record_count: i64,
    pub matched: i64,
    pub unmatched: i64,
    pub percentage: f64,
}

/// Output of [`aggregate_reconciliation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationAggregate {
    /// Input reconciliation rows, verbatim and in input order.
    pub by_day: Vec<RawRow>,
    /// All months, ascending by calendar order.
    pub months: Vec<ReconciliationMonth>,
    /// Company totals, ascending by company code.
    pub companies: Vec<ReconciliationCompany>,
    pub grand: ReconciliationGrand,
    /// Rows excluded from month grouping (unparseable date).
    pub skipped: Vec<SkippedRow>,
}

impl ReconciliationAggregate {
    /// The most recent `window` months (tail of the ascending sequence).
    /// The window is presentation policy; company and grand totals are
    /// never affected by it.
    pub fn recent_months(&self, window: usize) -> &[ReconciliationMonth] {
        let start = self.months.len().saturating_sub(window);
        &self.months[start..]
    }
}

#[derive(Default)]
struct MonthAccum {
    matched: i64,
    unmatched: i64,
}

#[derive(Default)]
struct CompanyAccum {
    record_count: i64,
    matched: i64,
    unmatched: i64,
    last_update: Option<NaiveDate>,
}

/// Fold reconciliation rows into day / month / company / grand totals.
///
/// Rows of other kinds are ignored; the decoder tags each payload with a
/// single kind, so a mixed slice indicates a caller bug, not dirty data.
pub fn aggregate_reconciliation(rows: &[RawRow]) -> ReconciliationAggregate {
    let mut by_day: Vec<RawRow> = Vec::new();
    let mut months: BTreeMap<MonthKey, MonthAccum> = BTreeMap::new();
    let mut companies: BTreeMap<i64, CompanyAccum> = BTreeMap::new();
    let mut grand = ReconciliationGrand {
        record_count: 0,
        matched: 0,
        unmatched: 0,
        percentage: 0.0,
    };
    let mut skipped: Vec<SkippedRow> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let RawRow::Reconciliation {
            company_code,
            record_count,
            date,
            matched_count,
            unmatched_count,
        } = row
        else {
            continue;
        };

        by_day.push(row.clone());

        grand.record_count += record_count;
        grand.matched += matched_count;
        grand.unmatched += unmatched_count;

        let company = companies.entry(*company_code).or_default();
        company.record_count += record_count;
        company.matched += matched_count;
        company.unmatched += unmatched_count;

        match parse_row_date(date) {
            Some(parsed) => {
                company.last_update = Some(match company.last_update {
                    Some(prev) => prev.max(parsed),
                    None => parsed,
                });
                let month = months.entry(MonthKey::from_date(parsed)).or_default();
                month.matched += matched_count;
                month.unmatched += unmatched_count;
            }
            None => skipped.push(SkippedRow {
                index,
                company_code: *company_code,
                raw_date: date.clone(),
            }),
        }
    }

    grand.percentage = percentage(grand.matched, grand.record_count);

    let months = months
        .into_iter()
        .map(|(key, acc)| {
            let total = acc.matched + acc.unmatched;
            ReconciliationMonth {
                key,
                label: key.label(),
                display_label: key.display_label(),
                matched: acc.matched,
                unmatched: acc.unmatched,
                total,
                percentage: percentage(acc.matched, total),
            }
        })
        .collect();

    let companies = companies
        .into_iter()
        .map(|(company_code, acc)| ReconciliationCompany {
            company_code,
            record_count: acc.record_count,
            matched: acc.matched,
            unmatched: acc.unmatched,
            percentage: percentage(acc.matched, acc.record_count),
            last_update: acc.last_update,
        })
        .collect();

    ReconciliationAggregate {
        by_day,
        months,
        companies,
        grand,
        skipped,
    }
}
