use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use panel_config::PanelConfig;
use panel_core::{PanelError, PersistedCredential, TokenClaims};

use crate::introspect::decode_token;
use crate::store::TokenStore;

/// A token is renewed when its remaining lifetime drops below this.
pub const RENEWAL_BUFFER_SECS: i64 = 30;

/// Timeout for token-endpoint requests.
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Supplies the entity code used on the login path when no explicit
/// override is configured. Wired to the company directory by the client
/// crate; tests use [`FixedEntity`].
#[async_trait::async_trait]
pub trait DefaultEntitySource: Send + Sync {
    async fn default_entity(&self) -> Result<i64, PanelError>;
}

/// A constant entity code.
pub struct FixedEntity(pub i64);

#[async_trait::async_trait]
impl DefaultEntitySource for FixedEntity {
    async fn default_entity(&self) -> Result<i64, PanelError> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Default)]
struct CredentialState {
    token: Option<String>,
    expires_at_ms: i64,
    /// Access key the cached token was issued under.
    scope_key: Option<String>,
    /// Access key in effect right now (mutable input).
    current_key: Option<String>,
}

/// Owns the bearer token: acquisition, expiry tracking, proactive
/// renewal, persistence mirror and key-change invalidation.
///
/// State lives behind one async mutex and is mutated only at synchronous
/// points; the lock is never held across the login request itself.
pub struct CredentialManager {
    http: reqwest::Client,
    config: PanelConfig,
    store: Box<dyn TokenStore>,
    entity_source: Arc<dyn DefaultEntitySource>,
    state: Mutex<CredentialState>,
}

impl CredentialManager {
    pub fn new(
        config: PanelConfig,
        store: Box<dyn TokenStore>,
        entity_source: Arc<dyn DefaultEntitySource>,
    ) -> Self {
        Self::new_with_client(reqwest::Client::new(), config, store, entity_source)
    }

    /// Share an existing HTTP client (connection pool) with the caller.
    pub fn new_with_client(
        http: reqwest::Client,
        config: PanelConfig,
        store: Box<dyn TokenStore>,
        entity_source: Arc<dyn DefaultEntitySource>,
    ) -> Self {
        let current_key = config.access_key.clone();
        Self {
            http,
            config,
            store,
            entity_source,
            state: Mutex::new(CredentialState {
                current_key,
                ..Default::default()
            }),
        }
    }

    /// Replace the access key in effect. The cached token is invalidated
    /// on the next call if it was issued under a different key.
    pub async fn set_access_key(&self, key: Option<String>) {
        self.state.lock().await.current_key = key;
    }

    /// Return a valid token, transparently logging in or renewing.
    pub async fn get_token(&self) -> Result<String, PanelError> {
        let key = {
            let mut state = self.state.lock().await;

            // Key mismatch invalidates before any other check.
            self.invalidate_on_key_change(&mut state);

            if state.token.is_none() {
                self.restore_from_mirror(&mut state);
            }

            if let Some(token) = &state.token {
                let now_ms = Utc::now().timestamp_millis();
                if state.expires_at_ms - now_ms > RENEWAL_BUFFER_SECS * 1000 {
                    debug!("serving cached token");
                    return Ok(token.clone());
                }
            }

            state.current_key.clone()
        };

        self.login_with_key(key).await
    }

    /// Request a new token for the current access key.
    pub async fn login(&self) -> Result<String, PanelError> {
        let key = {
            let mut state = self.state.lock().await;
            self.invalidate_on_key_change(&mut state);
            state.current_key.clone()
        };
        self.login_with_key(key).await
    }

    /// Clear the in-memory credential and the persisted mirror.
    pub async fn logout(&self) {
        let mut state = self.state.lock().await;
        state.token = None;
        state.expires_at_ms = 0;
        state.scope_key = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "credential mirror clear failed");
        }
    }

    /// Claims of the current (possibly freshly acquired) token, or `None`
    /// when the payload is not introspectable.
    pub async fn user_info(&self) -> Result<Option<TokenClaims>, PanelError> {
        let token = self.get_token().await?;
        Ok(decode_token(&token))
    }

    fn invalidate_on_key_change(&self, state: &mut CredentialState) {
        if state.scope_key.is_some() && state.scope_key != state.current_key {
            info!("access key changed, invalidating cached token");
            state.token = None;
            state.expires_at_ms = 0;
            state.scope_key = None;
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "credential mirror clear failed");
            }
        }
    }

    fn restore_from_mirror(&self, state: &mut CredentialState) {
        let Some(persisted) = self.store.load() else {
            return;
        };
        if persisted.scope_key != state.current_key {
            debug!("persisted credential belongs to a different access key, ignoring");
            return;
        }
        if Utc::now().timestamp_millis() >= persisted.expires_at_ms {
            return;
        }
        debug!("restored credential from mirror");
        state.token = Some(persisted.token);
        state.expires_at_ms = persisted.expires_at_ms;
        state.scope_key = persisted.scope_key;
    }

    async fn login_with_key(&self, key: Option<String>) -> Result<String, PanelError> {
        let key = key.ok_or_else(|| {
            PanelError::Configuration(
                "access key not configured; pass --key or set PANEL_ACCESS_KEY".into(),
            )
        })?;

        let entity = match self.config.default_entity {
            Some(code) => code,
            None => self.entity_source.default_entity().await?,
        };

        let url = format!(
            "{}{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.token_endpoint,
            entity
        );

        let resp = self
            .http
            .get(url)
            .query(&[("CHAVE", key.as_str())])
            .timeout(AUTH_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PanelError::Auth(format!(
                "token endpoint answered with status {}",
                status.as_u16()
            )));
        }

        let body: TokenResponse = resp.json().await?;
        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PanelError::Auth("token endpoint response missing access_token".into()))?;
        let expires_in = body
            .expires_in
            .ok_or_else(|| PanelError::Auth("token endpoint response missing expires_in".into()))?;

        let expires_at_ms = Utc::now().timestamp_millis() + expires_in * 1000;

        let mut state = self.state.lock().await;
        state.token = Some(token.clone());
        state.expires_at_ms = expires_at_ms;
        state.scope_key = Some(key.clone());

        let persisted = PersistedCredential {
            token: token.clone(),
            expires_at_ms,
            scope_key: Some(key),
        };
        if let Err(e) = self.store.save(&persisted) {
            warn!(error = %e, "credential mirror write failed");
        }

        info!(expires_in, "token acquired");
        Ok(token)
    }
}
