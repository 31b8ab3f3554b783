//! panel-config
//!
//! Configuration surface for the panel workspace: base API URL, access
//! key, optional default-entity override and the token endpoint path.
//!
//! Resolution precedence, per value:
//!   explicit override > environment variable > static fallback
//!
//! Resolution is a pure function over an injected environment snapshot so
//! tests never touch the process environment. The CLI performs the
//! `.env.local` bootstrap (dotenvy) before snapshotting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use panel_core::PanelError;

/// Environment variable names read by [`PanelConfig::resolve`].
pub const ENV_API_URL: &str = "PANEL_API_URL";
pub const ENV_ACCESS_KEY: &str = "PANEL_ACCESS_KEY";
pub const ENV_ENTITY: &str = "PANEL_ENTITY";
pub const ENV_TOKEN_ENDPOINT: &str = "PANEL_TOKEN_ENDPOINT";

/// Static fallbacks when neither override nor environment provides a value.
pub const FALLBACK_API_URL: &str = "http://localhost:8080";
pub const FALLBACK_TOKEN_ENDPOINT: &str = "/INTEGRACAO/TOKEN_RETAGUARDA";

/// Explicit per-value overrides (request-time parameters in the original
/// deployment; CLI flags here). `None` means "fall through".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub access_key: Option<String>,
    pub default_entity: Option<i64>,
    pub token_endpoint: Option<String>,
}

/// Resolved configuration. Plain value type; cheap to clone into the
/// client and credential manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub base_url: String,
    /// Tenant-scoping access key. Absent config is legal until the first
    /// authenticated call, which fails with a Configuration error.
    pub access_key: Option<String>,
    /// Explicit default-entity override; when absent the client resolves
    /// the default entity from the company directory.
    pub default_entity: Option<i64>,
    pub token_endpoint: String,
}

impl PanelConfig {
    /// Resolve a config from explicit overrides and an environment
    /// snapshot.
    pub fn resolve(overrides: ConfigOverrides, env: &BTreeMap<String, String>) -> Self {
        let pick = |explicit: Option<String>, var: &str| -> Option<String> {
            explicit
                .filter(|s| !s.trim().is_empty())
                .or_else(|| env.get(var).filter(|s| !s.trim().is_empty()).cloned())
        };

        let default_entity = overrides
            .default_entity
            .or_else(|| env.get(ENV_ENTITY).and_then(|s| s.trim().parse().ok()));

        Self {
            base_url: pick(overrides.base_url, ENV_API_URL)
                .unwrap_or_else(|| FALLBACK_API_URL.to_string()),
            access_key: pick(overrides.access_key, ENV_ACCESS_KEY),
            default_entity,
            token_endpoint: pick(overrides.token_endpoint, ENV_TOKEN_ENDPOINT)
                .unwrap_or_else(|| FALLBACK_TOKEN_ENDPOINT.to_string()),
        }
    }

    /// Resolve from the process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Self {
        let env: BTreeMap<String, String> = std::env::vars().collect();
        Self::resolve(overrides, &env)
    }

    pub fn has_access_key(&self) -> bool {
        self.access_key.is_some()
    }

    /// The access key, or a Configuration error with a remediation hint.
    pub fn require_access_key(&self) -> Result<&str, PanelError> {
        self.access_key.as_deref().ok_or_else(|| {
            PanelError::Configuration(format!(
                "access key not configured; pass --key or set {ENV_ACCESS_KEY}"
            ))
        })
    }

    /// Query parameters for a shareable URL: the access key, plus the
    /// entity only when explicitly overridden.
    pub fn share_params(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(key) = &self.access_key {
            parts.push(format!("chave={key}"));
        }
        if let Some(entity) = self.default_entity {
            parts.push(format!("unidade={entity}"));
        }
        parts.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn explicit_override_beats_env() {
        let cfg = PanelConfig::resolve(
            ConfigOverrides {
                base_url: Some("https://api.example".into()),
                ..Default::default()
            },
            &env(&[(ENV_API_URL, "https://env.example")]),
        );
        assert_eq!(cfg.base_url, "https://api.example");
    }

    #[test]
    fn env_beats_static_fallback() {
        let cfg = PanelConfig::resolve(
            ConfigOverrides::default(),
            &env(&[(ENV_API_URL, "https://env.example")]),
        );
        assert_eq!(cfg.base_url, "https://env.example");
    }

    #[test]
    fn static_fallbacks_apply_on_empty_input() {
        let cfg = PanelConfig::resolve(ConfigOverrides::default(), &BTreeMap::new());
        assert_eq!(cfg.base_url, FALLBACK_API_URL);
        assert_eq!(cfg.token_endpoint, FALLBACK_TOKEN_ENDPOINT);
        assert!(cfg.access_key.is_none());
        assert!(cfg.default_entity.is_none());
    }

    #[test]
    fn blank_override_falls_through() {
        let cfg = PanelConfig::resolve(
            ConfigOverrides {
                access_key: Some("  ".into()),
                ..Default::default()
            },
            &env(&[(ENV_ACCESS_KEY, "k-123")]),
        );
        assert_eq!(cfg.access_key.as_deref(), Some("k-123"));
    }

    #[test]
    fn entity_parses_from_env() {
        let cfg = PanelConfig::resolve(ConfigOverrides::default(), &env(&[(ENV_ENTITY, "55229")]));
        assert_eq!(cfg.default_entity, Some(55229));
    }

    #[test]
    fn require_access_key_names_the_env_var() {
        let cfg = PanelConfig::resolve(ConfigOverrides::default(), &BTreeMap::new());
        let err = cfg.require_access_key().unwrap_err();
        assert!(err.to_string().contains(ENV_ACCESS_KEY));
    }

    #[test]
    fn share_params_omits_unset_entity() {
        let cfg = PanelConfig::resolve(
            ConfigOverrides {
                access_key: Some("k-1".into()),
                ..Default::default()
            },
            &BTreeMap::new(),
        );
        assert_eq!(cfg.share_params(), "chave=k-1");

        let cfg = PanelConfig::resolve(
            ConfigOverrides {
                access_key: Some("k-1".into()),
                default_entity: Some(42),
                ..Default::default()
            },
            &BTreeMap::new(),
        );
        assert_eq!(cfg.share_params(), "chave=k-1&unidade=42");
    }
}
