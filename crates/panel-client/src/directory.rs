//! Company directory cache.
//!
//! Maps a numeric company code to its display metadata, scoped to the
//! current access key. A refresh replaces the whole entry set atomically;
//! entries cached under a changed key are discarded, never merged.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use panel_auth::DefaultEntitySource;
use panel_config::PanelConfig;
use panel_core::{CompanyRecord, PanelError};

/// Directory entries are served from cache for this long.
pub const DIRECTORY_TTL_SECS: i64 = 5 * 60;

/// Entity code used when neither an override nor the directory can
/// supply one.
pub const FALLBACK_ENTITY_CODE: i64 = 55229;

const DIRECTORY_PATH: &str = "/INTEGRACAO/EMPRESAS";
const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(rename = "resultados", default)]
    results: Vec<CompanyRecord>,
}

#[derive(Default)]
struct DirectoryCache {
    entries: BTreeMap<i64, CompanyRecord>,
    /// Code of the first entry in the last successful fetch.
    first_code: Option<i64>,
    expires_at_ms: i64,
    /// Access key the entries were fetched under.
    scope_key: Option<String>,
    /// Memoized default entity for the current scope key.
    default_entity: Option<i64>,
    /// Access key in effect right now.
    current_key: Option<String>,
}

/// Process-wide directory cache; all consumers resolve through these
/// methods, never by touching cache fields.
pub struct CompanyDirectory {
    http: reqwest::Client,
    config: PanelConfig,
    ttl_secs: i64,
    cache: Mutex<DirectoryCache>,
}

impl CompanyDirectory {
    pub fn new(config: PanelConfig) -> Self {
        Self::new_with_client(reqwest::Client::new(), config)
    }

    pub fn new_with_client(http: reqwest::Client, config: PanelConfig) -> Self {
        let current_key = config.access_key.clone();
        Self {
            http,
            config,
            ttl_secs: DIRECTORY_TTL_SECS,
            cache: Mutex::new(DirectoryCache {
                current_key,
                ..Default::default()
            }),
        }
    }

    /// Override the cache TTL (tests exercise expiry without waiting).
    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Replace the access key in effect; cached entries under the old key
    /// are discarded on the next lookup.
    pub async fn set_access_key(&self, key: Option<String>) {
        self.cache.lock().await.current_key = key;
    }

    /// Resolve one company. Refreshes the directory on first use, cache
    /// expiry or key change; on refresh failure the last-known entries
    /// are served instead of surfacing an error.
    pub async fn resolve(&self, code: i64) -> Option<CompanyRecord> {
        self.refresh_if_needed().await;
        self.cache.lock().await.entries.get(&code).cloned()
    }

    /// Snapshot of all known companies (refreshing like [`resolve`]).
    pub async fn all(&self) -> Vec<CompanyRecord> {
        self.refresh_if_needed().await;
        self.cache.lock().await.entries.values().cloned().collect()
    }

    /// The default entity: configured override, else the first entry of a
    /// fresh directory fetch (memoized per access key), else the static
    /// fallback.
    pub async fn resolve_default_entity(&self) -> i64 {
        if let Some(code) = self.config.default_entity {
            return code;
        }

        {
            let mut cache = self.cache.lock().await;
            discard_on_key_change(&mut cache);
            if let Some(code) = cache.default_entity {
                return code;
            }
        }

        match self.refresh().await {
            Ok(()) => {
                let mut cache = self.cache.lock().await;
                match cache.first_code {
                    Some(code) => {
                        cache.default_entity = Some(code);
                        code
                    }
                    None => FALLBACK_ENTITY_CODE,
                }
            }
            Err(e) => {
                warn!(error = %e, "directory fetch failed, using fallback entity");
                FALLBACK_ENTITY_CODE
            }
        }
    }

    async fn refresh_if_needed(&self) {
        let needed = {
            let mut cache = self.cache.lock().await;
            discard_on_key_change(&mut cache);
            cache.entries.is_empty() || Utc::now().timestamp_millis() >= cache.expires_at_ms
        };
        if !needed {
            debug!("directory cache hit");
            return;
        }
        if let Err(e) = self.refresh().await {
            // Stale entries are better than no names; display-name
            // resolution is non-critical.
            warn!(error = %e, "directory refresh failed, serving last-known entries");
        }
    }

    /// Fetch the directory and replace the cache atomically.
    async fn refresh(&self) -> Result<(), PanelError> {
        let key = {
            let mut cache = self.cache.lock().await;
            discard_on_key_change(&mut cache);
            cache.current_key.clone()
        };
        let key = key.ok_or_else(|| {
            PanelError::Configuration("access key not configured for directory fetch".into())
        })?;

        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            DIRECTORY_PATH
        );
        let resp = self
            .http
            .get(url)
            .query(&[("chave", key.as_str())])
            .timeout(DIRECTORY_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let body: DirectoryResponse = resp.json().await?;

        let mut entries = BTreeMap::new();
        let first_code = body.results.first().map(|r| r.code);
        for record in body.results {
            entries.insert(record.code, record);
        }

        let mut cache = self.cache.lock().await;
        cache.entries = entries;
        cache.first_code = first_code;
        cache.expires_at_ms = Utc::now().timestamp_millis() + self.ttl_secs * 1000;
        cache.scope_key = Some(key);
        info!(companies = cache.entries.len(), "directory refreshed");
        Ok(())
    }
}

fn discard_on_key_change(cache: &mut DirectoryCache) {
    if cache.scope_key.is_some() && cache.scope_key != cache.current_key {
        info!("access key changed, discarding directory cache");
        cache.entries.clear();
        cache.first_code = None;
        cache.expires_at_ms = 0;
        cache.scope_key = None;
        cache.default_entity = None;
    }
}

#[async_trait::async_trait]
impl DefaultEntitySource for CompanyDirectory {
    async fn default_entity(&self) -> Result<i64, PanelError> {
        Ok(self.resolve_default_entity().await)
    }
}
