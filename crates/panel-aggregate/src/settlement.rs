//! Card-settlement aggregation.
//!
//! Same fold discipline as reconciliation; the metric set differs:
//! received / in-open-batch / open amounts against a reported total, with
//! `percentage = received / total * 100`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use panel_core::RawRow;

use crate::dates::{parse_row_date, MonthKey};
use crate::types::{percentage, SkippedRow};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementMonth {
    pub key: MonthKey,
    pub label: String,
    pub display_label: String,
    pub received: i64,
    pub in_open_batch: i64,
    pub open: i64,
    pub total: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementCompany {
    pub company_code: i64,
    pub card_count: i64,
    pub received: i64,
    pub in_open_batch: i64,
    pub open: i64,
    pub total: i64,
    pub percentage: f64,
    pub last_update: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementGrand {
    pub card_count: i64,
    pub received: i64,
    pub in_open_batch: i64,
    pub open: i64,
    pub total: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementAggregate {
    pub by_day: Vec<RawRow>,
    pub months: Vec<SettlementMonth>,
    pub companies: Vec<SettlementCompany>,
    pub grand: SettlementGrand,
    pub skipped: Vec<SkippedRow>,
}

impl SettlementAggregate {
    /// The most recent `window` months (tail of the ascending sequence).
    pub fn recent_months(&self, window: usize) -> &[SettlementMonth] {
        let start = self.months.len().saturating_sub(window);
        &self.months[start..]
    }
}

#[derive(Default)]
struct MonthAccum {
    received: i64,
    in_open_batch: i64,
    open: i64,
    total: i64,
}

#[derive(Default)]
struct CompanyAccum {
    card_count: i64,
    received: i64,
    in_open_batch: i64,
    open: i64,
    total: i64,
    last_update: Option<NaiveDate>,
}

/// Fold settlement rows into day / month / company / grand totals.
pub fn aggregate_settlement(rows: &[RawRow]) -> SettlementAggregate {
    let mut by_day: Vec<RawRow> = Vec::new();
    let mut months: BTreeMap<MonthKey, MonthAccum> = BTreeMap::new();
    let mut companies: BTreeMap<i64, CompanyAccum> = BTreeMap::new();
    let mut grand = SettlementGrand {
        card_count: 0,
        received: 0,
        in_open_batch: 0,
        open: 0,
        total: 0,
        percentage: 0.0,
    };
    let mut skipped: Vec<SkippedRow> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let RawRow::Settlement {
            company_code,
            card_count,
            date,
            received,
            in_open_batch,
            open,
            total,
        } = row
        else {
            continue;
        };

        by_day.push(row.clone());

        grand.card_count += card_count;
        grand.received += received;
        grand.in_open_batch += in_open_batch;
        grand.open += open;
        grand.total += total;

        let company = companies.entry(*company_code).or_default();
        company.card_count += card_count;
        company.received += received;
        company.in_open_batch += in_open_batch;
        company.open += open;
        company.total += total;

        match parse_row_date(date) {
            Some(parsed) => {
                company.last_update = Some(match company.last_update {
                    Some(prev) => prev.max(parsed),
                    None => parsed,
                });
                let month = months.entry(MonthKey::from_date(parsed)).or_default();
                month.received += received;
                month.in_open_batch += in_open_batch;
                month.open += open;
                month.total += total;
            }
            None => skipped.push(SkippedRow {
                index,
                company_code: *company_code,
                raw_date: date.clone(),
            }),
        }
    }

    grand.percentage = percentage(grand.received, grand.total);

    let months = months
        .into_iter()
        .map(|(key, acc)| SettlementMonth {
            key,
            label: key.label(),
            display_label: key.display_label(),
            received: acc.received,
            in_open_batch: acc.in_open_batch,
            open: acc.open,
            total: acc.total,
            percentage: percentage(acc.received, acc.total),
        })
        .collect();

    let companies = companies
        .into_iter()
        .map(|(company_code, acc)| SettlementCompany {
            company_code,
            card_count: acc.card_count,
            received: acc.received,
            in_open_batch: acc.in_open_batch,
            open: acc.open,
            total: acc.total,
            percentage: percentage(acc.received, acc.total),
            last_update: acc.last_update,
        })
        .collect();

    SettlementAggregate {
        by_day,
        months,
        companies,
        grand,
        skipped,
    }
}
