use std::collections::BTreeMap;

use chrono::Utc;

use panel_aggregate::{aggregate_reconciliation, aggregate_settlement, summarize_registers};
use panel_client::PanelClient;
use panel_core::{CompanyRecord, PanelError};

use crate::reports::{
    NamedRegisterIndicator, ReconciliationCompanyReport, ReconciliationReport, RegisterReport,
    SettlementCompanyReport, SettlementReport,
};

/// Display-name fallback chain: trade name, abbreviation, numeric
/// placeholder. Empty strings count as absent.
pub fn display_name(record: Option<&CompanyRecord>, code: i64) -> String {
    record
        .and_then(|r| {
            [&r.trade_name, &r.abbreviation]
                .into_iter()
                .find(|s| !s.trim().is_empty())
        })
        .cloned()
        .unwrap_or_else(|| format!("Company {code}"))
}

/// Builds the report values consumed by the presentation layer.
pub struct ReportAssembler {
    client: PanelClient,
}

impl ReportAssembler {
    pub fn new(client: PanelClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PanelClient {
        &self.client
    }

    /// Fetch, aggregate and name the reconciliation data. `window` is the
    /// presentation bound on the month series (the dashboard uses 6).
    pub async fn build_reconciliation_report(
        &self,
        window: usize,
    ) -> Result<ReconciliationReport, PanelError> {
        let table = self.client.fetch_reconciliation().await?;
        let agg = aggregate_reconciliation(&table.rows);

        let names = self
            .resolve_names(agg.companies.iter().map(|c| c.company_code))
            .await;

        let recent_months = agg.recent_months(window).to_vec();
        let companies = agg
            .companies
            .into_iter()
            .map(|totals| ReconciliationCompanyReport {
                name: names[&totals.company_code].clone(),
                totals,
            })
            .collect();

        Ok(ReconciliationReport {
            companies,
            by_day: agg.by_day,
            recent_months,
            months: agg.months,
            grand: agg.grand,
            skipped: agg.skipped,
            generated_at: Utc::now(),
        })
    }

    /// Settlement counterpart of [`build_reconciliation_report`].
    pub async fn build_settlement_report(
        &self,
        window: usize,
    ) -> Result<SettlementReport, PanelError> {
        let table = self.client.fetch_settlement().await?;
        let agg = aggregate_settlement(&table.rows);

        let names = self
            .resolve_names(agg.companies.iter().map(|c| c.company_code))
            .await;

        let recent_months = agg.recent_months(window).to_vec();
        let companies = agg
            .companies
            .into_iter()
            .map(|totals| SettlementCompanyReport {
                name: names[&totals.company_code].clone(),
                totals,
            })
            .collect();

        Ok(SettlementReport {
            companies,
            by_day: agg.by_day,
            recent_months,
            months: agg.months,
            grand: agg.grand,
            skipped: agg.skipped,
            generated_at: Utc::now(),
        })
    }

    /// Till-session indicators with resolved names.
    pub async fn build_register_report(&self) -> Result<RegisterReport, PanelError> {
        let table = self.client.fetch_register_state().await?;
        let indicators = summarize_registers(&table.rows);

        let names = self
            .resolve_names(indicators.iter().map(|i| i.company_code))
            .await;

        let indicators = indicators
            .into_iter()
            .map(|indicator| NamedRegisterIndicator {
                name: names[&indicator.company_code].clone(),
                indicator,
            })
            .collect();

        Ok(RegisterReport {
            indicators,
            generated_at: Utc::now(),
        })
    }

    /// Indicator for one company, or NotFound when it has no
    /// register-state row.
    pub async fn register_indicator_for(
        &self,
        code: i64,
    ) -> Result<NamedRegisterIndicator, PanelError> {
        let report = self.build_register_report().await?;
        report
            .indicators
            .into_iter()
            .find(|i| i.indicator.company_code == code)
            .ok_or_else(|| PanelError::NotFound(format!("company {code} has no register state")))
    }

    /// One directory lookup per distinct code per build.
    async fn resolve_names(
        &self,
        codes: impl Iterator<Item = i64>,
    ) -> BTreeMap<i64, String> {
        let mut names = BTreeMap::new();
        for code in codes {
            if names.contains_key(&code) {
                continue;
            }
            let record = self.client.directory().resolve(code).await;
            names.insert(code, display_name(record.as_ref(), code));
        }
        names
    }
}
