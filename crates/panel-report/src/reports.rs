use chrono::{DateTime, Utc};
use serde::Serialize;

use panel_aggregate::{
    RegisterIndicator, ReconciliationCompany, ReconciliationGrand, ReconciliationMonth,
    SettlementCompany, SettlementGrand, SettlementMonth, SkippedRow,
};
use panel_core::RawRow;

/// Company totals plus the resolved display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationCompanyReport {
    pub name: String,
    #[serde(flatten)]
    pub totals: ReconciliationCompany,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementCompanyReport {
    pub name: String,
    #[serde(flatten)]
    pub totals: SettlementCompany,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRegisterIndicator {
    pub name: String,
    #[serde(flatten)]
    pub indicator: RegisterIndicator,
}

/// Bank-statement matching report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub companies: Vec<ReconciliationCompanyReport>,
    /// Per-date-per-company rows, verbatim from the backend.
    pub by_day: Vec<RawRow>,
    /// Full month series, ascending.
    pub months: Vec<ReconciliationMonth>,
    /// Tail window of `months` for presentation.
    pub recent_months: Vec<ReconciliationMonth>,
    pub grand: ReconciliationGrand,
    pub skipped: Vec<SkippedRow>,
    pub generated_at: DateTime<Utc>,
}

/// Card-settlement report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub companies: Vec<SettlementCompanyReport>,
    pub by_day: Vec<RawRow>,
    pub months: Vec<SettlementMonth>,
    pub recent_months: Vec<SettlementMonth>,
    pub grand: SettlementGrand,
    pub skipped: Vec<SkippedRow>,
    pub generated_at: DateTime<Utc>,
}

/// Till-session state report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterReport {
    pub indicators: Vec<NamedRegisterIndicator>,
    pub generated_at: DateTime<Utc>,
}
