use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use tracing::warn;

use panel_auth::{CredentialManager, TokenStore};
use panel_config::PanelConfig;
use panel_core::{PanelError, RecordKind};
use panel_decode::{decode, DecodedTable, TableEnvelope};

use crate::directory::CompanyDirectory;

/// Paths under this namespace carry the bearer token; everything else is
/// sent unauthenticated.
pub const PROTECTED_NAMESPACE: &str = "/PAINEL_OPERACAO";

const REGISTERS_PATH: &str = "/PAINEL_OPERACAO/CAIXAS_DESCONSOLIDADOS";
const RECONCILIATION_PATH: &str = "/PAINEL_OPERACAO/OFX";
const SETTLEMENT_PATH: &str = "/PAINEL_OPERACAO/CARTAO_PAGAMENTO";

/// Bulk data fetches get a wider bound than auth/directory traffic.
const DATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend client: wires the credential manager, the directory cache and
/// the bulk endpoints over one shared HTTP connection pool.
pub struct PanelClient {
    http: reqwest::Client,
    config: PanelConfig,
    auth: Arc<CredentialManager>,
    directory: Arc<CompanyDirectory>,
}

impl PanelClient {
    /// Build the full client stack. The directory doubles as the
    /// default-entity source for login.
    pub fn new(config: PanelConfig, store: Box<dyn TokenStore>) -> Self {
        let http = reqwest::Client::new();
        let directory = Arc::new(CompanyDirectory::new_with_client(
            http.clone(),
            config.clone(),
        ));
        let auth = Arc::new(CredentialManager::new_with_client(
            http.clone(),
            config.clone(),
            store,
            directory.clone(),
        ));
        Self {
            http,
            config,
            auth,
            directory,
        }
    }

    pub fn auth(&self) -> &Arc<CredentialManager> {
        &self.auth
    }

    pub fn directory(&self) -> &Arc<CompanyDirectory> {
        &self.directory
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Till-session state per company.
    pub async fn fetch_register_state(&self) -> Result<DecodedTable, PanelError> {
        self.get_table(REGISTERS_PATH, RecordKind::RegisterState)
            .await
    }

    /// Bank-statement matching rows per company per day.
    pub async fn fetch_reconciliation(&self) -> Result<DecodedTable, PanelError> {
        self.get_table(RECONCILIATION_PATH, RecordKind::Reconciliation)
            .await
    }

    /// Card-settlement rows per company per day.
    pub async fn fetch_settlement(&self) -> Result<DecodedTable, PanelError> {
        self.get_table(SETTLEMENT_PATH, RecordKind::Settlement).await
    }

    async fn get_table(&self, path: &str, kind: RecordKind) -> Result<DecodedTable, PanelError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .timeout(DATA_TIMEOUT);

        if path.contains(PROTECTED_NAMESPACE) {
            let token = self.auth.get_token().await?;
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?.error_for_status()?;
        let envelope: TableEnvelope = resp.json().await?;
        let decoded = decode(&envelope, kind)?;
        if decoded.warning {
            warn!(
                endpoint = path,
                return_code = decoded.return_code,
                "backend reported a non-zero return code; payload may be degraded"
            );
        }
        Ok(decoded)
    }
}
