use serde::{Deserialize, Serialize};

/// Which backend table a positional payload represents.
///
/// Resolved once at decode time; downstream code matches on [`RawRow`]
/// variants instead of probing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Open / closed / unconsolidated till-session counts per company.
    RegisterState,
    /// Bank-statement matching counts per company per day.
    Reconciliation,
    /// Card-payment clearing amounts per company per day.
    Settlement,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::RegisterState => "register-state",
            RecordKind::Reconciliation => "reconciliation",
            RecordKind::Settlement => "settlement",
        }
    }

    /// Expected positional arity of one data row.
    pub fn arity(&self) -> usize {
        match self {
            RecordKind::RegisterState => 5,
            RecordKind::Reconciliation => 5,
            RecordKind::Settlement => 7,
        }
    }
}

/// One decoded data row, tagged by record kind.
///
/// Dates are kept as the backend's text form (`DD/MM/YYYY` or
/// `YYYY-MM-DD`); parsing is the aggregator's concern because upstream
/// data is not guaranteed clean and unparseable dates are skipped there,
/// not failed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawRow {
    Reconciliation {
        company_code: i64,
        /// Total statement entries for the day (the percentage denominator).
        record_count: i64,
        date: String,
        matched_count: i64,
        unmatched_count: i64,
    },

    Settlement {
        company_code: i64,
        card_count: i64,
        date: String,
        received: i64,
        in_open_batch: i64,
        open: i64,
        total: i64,
    },

    RegisterState {
        company_code: i64,
        open_count: i64,
        /// Null on the wire when no register is currently open.
        oldest_open_date: Option<String>,
        closed_count: i64,
        oldest_unconsolidated_date: String,
    },
}

impl RawRow {
    pub fn company_code(&self) -> i64 {
        match self {
            RawRow::Reconciliation { company_code, .. }
            | RawRow::Settlement { company_code, .. }
            | RawRow::RegisterState { company_code, .. } => *company_code,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RawRow::Reconciliation { .. } => RecordKind::Reconciliation,
            RawRow::Settlement { .. } => RecordKind::Settlement,
            RawRow::RegisterState { .. } => RecordKind::RegisterState,
        }
    }
}

/// Directory record for one business unit, field names mapped from the
/// backend's wire contract. Immutable once fetched within a cache epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "empresaCodigo")]
    pub code: i64,
    #[serde(default)]
    pub cnpj: String,
    #[serde(rename = "razao", default)]
    pub legal_name: String,
    #[serde(rename = "fantasia", default)]
    pub trade_name: String,
    #[serde(rename = "sigla", default)]
    pub abbreviation: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "bairro", default)]
    pub district: String,
    #[serde(rename = "cidade", default)]
    pub city: String,
    #[serde(rename = "estado", default)]
    pub state: String,
    #[serde(rename = "codigo", default)]
    pub sequence: i64,
}

/// Credential shape mirrored to the key-value token store for session
/// continuity. `scope_key` is the access key the token was issued under;
/// a mirror whose scope key differs from the current one is ignored and
/// cleared, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCredential {
    pub token: String,
    /// Expiry as UTC epoch milliseconds.
    pub expires_at_ms: i64,
    pub scope_key: Option<String>,
}

/// Claims carried in the bearer token payload.
///
/// Populated by unauthenticated introspection only; the signature is
/// never verified on this side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "TOK_CD_USUARIO")]
    pub user_code: i64,
    #[serde(rename = "TOK_CD_REDE")]
    pub network_code: i64,
    #[serde(rename = "TOK_CD_PERFIL")]
    pub profile_code: i64,
    #[serde(rename = "TOK_CD_UNIDADE_NEGOCIO")]
    pub entity_code: i64,
    pub exp: i64,
    #[serde(default)]
    pub iss: String,
}
