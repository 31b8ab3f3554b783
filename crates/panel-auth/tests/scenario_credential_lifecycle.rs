use std::collections::BTreeMap;
use std::sync::Arc;

use httpmock::prelude::*;

use panel_auth::{CredentialManager, FileTokenStore, FixedEntity, MemoryTokenStore, TokenStore};
use panel_config::{ConfigOverrides, PanelConfig};
use panel_core::PanelError;

const TOKEN_PATH: &str = "/INTEGRACAO/TOKEN_RETAGUARDA/55229";

fn config(base_url: &str, key: Option<&str>) -> PanelConfig {
    PanelConfig::resolve(
        ConfigOverrides {
            base_url: Some(base_url.into()),
            access_key: key.map(str::to_owned),
            default_entity: Some(55229),
            ..Default::default()
        },
        &BTreeMap::new(),
    )
}

fn manager(base_url: &str, key: Option<&str>) -> CredentialManager {
    CredentialManager::new(
        config(base_url, key),
        Box::new(MemoryTokenStore::new()),
        Arc::new(FixedEntity(55229)),
    )
}

fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in
    })
}

#[tokio::test]
async fn scenario_token_is_cached_within_renewal_buffer() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH).query_param("CHAVE", "k-1");
        then.status(200).json_body(token_body("tok-a", 3600));
    });

    let mgr = manager(&server.base_url(), Some("k-1"));
    let first = mgr.get_token().await.unwrap();
    let second = mgr.get_token().await.unwrap();

    assert_eq!(first, "tok-a");
    assert_eq!(first, second);
    mock.assert_hits(1);
}

#[tokio::test]
async fn scenario_key_change_discards_time_valid_token() {
    let server = MockServer::start();
    let mock_k1 = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH).query_param("CHAVE", "k-1");
        then.status(200).json_body(token_body("tok-a", 3600));
    });
    let mock_k2 = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH).query_param("CHAVE", "k-2");
        then.status(200).json_body(token_body("tok-b", 3600));
    });

    let mgr = manager(&server.base_url(), Some("k-1"));
    assert_eq!(mgr.get_token().await.unwrap(), "tok-a");

    mgr.set_access_key(Some("k-2".into())).await;
    assert_eq!(mgr.get_token().await.unwrap(), "tok-b");

    // Exactly one login per key; the first token was still time valid.
    mock_k1.assert_hits(1);
    mock_k2.assert_hits(1);
}

#[tokio::test]
async fn scenario_token_below_buffer_is_renewed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH);
        // 10 s lifetime is inside the 30 s renewal buffer.
        then.status(200).json_body(token_body("tok-short", 10));
    });

    let mgr = manager(&server.base_url(), Some("k-1"));
    mgr.get_token().await.unwrap();
    mgr.get_token().await.unwrap();

    mock.assert_hits(2);
}

#[tokio::test]
async fn scenario_missing_access_key_fails_before_any_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH);
        then.status(200).json_body(token_body("tok-a", 3600));
    });

    let mgr = manager(&server.base_url(), None);
    let err = mgr.get_token().await.unwrap_err();
    assert!(matches!(err, PanelError::Configuration(_)));
    mock.assert_hits(0);
}

#[tokio::test]
async fn scenario_response_without_token_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH);
        then.status(200).json_body(serde_json::json!({ "token_type": "Bearer" }));
    });

    let mgr = manager(&server.base_url(), Some("k-1"));
    let err = mgr.get_token().await.unwrap_err();
    assert!(matches!(err, PanelError::Auth(_)));
}

#[tokio::test]
async fn scenario_error_status_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH);
        then.status(401).json_body(serde_json::json!({}));
    });

    let mgr = manager(&server.base_url(), Some("k-1"));
    let err = mgr.get_token().await.unwrap_err();
    assert!(matches!(err, PanelError::Auth(_)));
}

#[tokio::test]
async fn scenario_mirror_resumes_session_without_new_login() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH).query_param("CHAVE", "k-1");
        then.status(200).json_body(token_body("tok-a", 3600));
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential.json");

    let first = CredentialManager::new(
        config(&server.base_url(), Some("k-1")),
        Box::new(FileTokenStore::new(&path)),
        Arc::new(FixedEntity(55229)),
    );
    assert_eq!(first.get_token().await.unwrap(), "tok-a");

    // A fresh manager over the same store resumes the session.
    let second = CredentialManager::new(
        config(&server.base_url(), Some("k-1")),
        Box::new(FileTokenStore::new(&path)),
        Arc::new(FixedEntity(55229)),
    );
    assert_eq!(second.get_token().await.unwrap(), "tok-a");

    mock.assert_hits(1);
}

#[tokio::test]
async fn scenario_mirror_under_other_key_is_ignored() {
    let server = MockServer::start();
    let mock_k2 = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH).query_param("CHAVE", "k-2");
        then.status(200).json_body(token_body("tok-b", 3600));
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential.json");
    let store = FileTokenStore::new(&path);
    store
        .save(&panel_core::PersistedCredential {
            token: "tok-stale".into(),
            expires_at_ms: i64::MAX,
            scope_key: Some("k-1".into()),
        })
        .unwrap();

    let mgr = CredentialManager::new(
        config(&server.base_url(), Some("k-2")),
        Box::new(FileTokenStore::new(&path)),
        Arc::new(FixedEntity(55229)),
    );
    assert_eq!(mgr.get_token().await.unwrap(), "tok-b");
    mock_k2.assert_hits(1);
}

#[tokio::test]
async fn scenario_logout_clears_memory_and_mirror() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(TOKEN_PATH);
        then.status(200).json_body(token_body("tok-a", 3600));
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credential.json");

    let mgr = CredentialManager::new(
        config(&server.base_url(), Some("k-1")),
        Box::new(FileTokenStore::new(&path)),
        Arc::new(FixedEntity(55229)),
    );
    mgr.get_token().await.unwrap();
    mgr.logout().await;

    assert!(FileTokenStore::new(&path).load().is_none());

    // Next call logs in again.
    mgr.get_token().await.unwrap();
    mock.assert_hits(2);
}

#[tokio::test]
async fn scenario_entity_source_used_when_no_override() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/TOKEN_RETAGUARDA/42");
        then.status(200).json_body(token_body("tok-42", 3600));
    });

    let mut cfg = config(&server.base_url(), Some("k-1"));
    cfg.default_entity = None;
    let mgr = CredentialManager::new(
        cfg,
        Box::new(MemoryTokenStore::new()),
        Arc::new(FixedEntity(42)),
    );
    assert_eq!(mgr.get_token().await.unwrap(), "tok-42");
    mock.assert_hits(1);
}
