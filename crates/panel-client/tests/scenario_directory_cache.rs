use std::collections::BTreeMap;

use httpmock::prelude::*;
use serde_json::json;

use panel_client::{CompanyDirectory, FALLBACK_ENTITY_CODE};
use panel_config::{ConfigOverrides, PanelConfig};

fn config(base_url: &str, key: &str) -> PanelConfig {
    PanelConfig::resolve(
        ConfigOverrides {
            base_url: Some(base_url.into()),
            access_key: Some(key.into()),
            ..Default::default()
        },
        &BTreeMap::new(),
    )
}

fn companies_body() -> serde_json::Value {
    json!({
        "ultimoCodigo": 2,
        "resultados": [
            {
                "empresaCodigo": 7,
                "razao": "Filial Sete Ltda",
                "fantasia": "Filial Sete",
                "sigla": "F7"
            },
            {
                "empresaCodigo": 3,
                "razao": "Filial Tres Ltda",
                "fantasia": "Filial Tres",
                "sigla": "F3"
            }
        ]
    })
}

#[tokio::test]
async fn scenario_directory_served_from_cache_within_ttl() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/INTEGRACAO/EMPRESAS")
            .query_param("chave", "k-1");
        then.status(200).json_body(companies_body());
    });

    let dir = CompanyDirectory::new(config(&server.base_url(), "k-1"));
    let first = dir.resolve(7).await.unwrap();
    let second = dir.resolve(3).await.unwrap();

    assert_eq!(first.trade_name, "Filial Sete");
    assert_eq!(second.abbreviation, "F3");
    mock.assert_hits(1);
}

#[tokio::test]
async fn scenario_unknown_code_is_none_not_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/EMPRESAS");
        then.status(200).json_body(companies_body());
    });

    let dir = CompanyDirectory::new(config(&server.base_url(), "k-1"));
    assert!(dir.resolve(999).await.is_none());
}

#[tokio::test]
async fn scenario_refresh_failure_serves_stale_entries() {
    let server = MockServer::start();
    let mut ok = server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/EMPRESAS");
        then.status(200).json_body(companies_body());
    });

    // TTL zero: every lookup is past expiry and attempts a refresh.
    let dir = CompanyDirectory::new(config(&server.base_url(), "k-1")).with_ttl_secs(0);
    assert!(dir.resolve(7).await.is_some());

    // Backend starts failing; the 5-minute-old cache keeps answering.
    ok.delete();
    server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/EMPRESAS");
        then.status(500);
    });

    let record = dir.resolve(7).await.unwrap();
    assert_eq!(record.trade_name, "Filial Sete");
}

#[tokio::test]
async fn scenario_key_change_discards_entries_not_merges() {
    let server = MockServer::start();
    let mock_k1 = server.mock(|when, then| {
        when.method(GET)
            .path("/INTEGRACAO/EMPRESAS")
            .query_param("chave", "k-1");
        then.status(200).json_body(companies_body());
    });
    let mock_k2 = server.mock(|when, then| {
        when.method(GET)
            .path("/INTEGRACAO/EMPRESAS")
            .query_param("chave", "k-2");
        then.status(200).json_body(json!({
            "ultimoCodigo": 1,
            "resultados": [
                { "empresaCodigo": 50, "fantasia": "Outra Rede", "sigla": "OR" }
            ]
        }));
    });

    let dir = CompanyDirectory::new(config(&server.base_url(), "k-1"));
    assert!(dir.resolve(7).await.is_some());

    dir.set_access_key(Some("k-2".into())).await;
    // Entries from the previous tenant are gone, not merged in.
    assert!(dir.resolve(7).await.is_none());
    assert!(dir.resolve(50).await.is_some());

    mock_k1.assert_hits(1);
    mock_k2.assert_hits(1);
}

#[tokio::test]
async fn scenario_default_entity_prefers_configured_override() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/EMPRESAS");
        then.status(200).json_body(companies_body());
    });

    let mut cfg = config(&server.base_url(), "k-1");
    cfg.default_entity = Some(99);
    let dir = CompanyDirectory::new(cfg);

    assert_eq!(dir.resolve_default_entity().await, 99);
    mock.assert_hits(0);
}

#[tokio::test]
async fn scenario_default_entity_is_first_entry_and_memoized() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/EMPRESAS");
        then.status(200).json_body(companies_body());
    });

    let dir = CompanyDirectory::new(config(&server.base_url(), "k-1"));
    // First entry of the fetch order, not the lowest code.
    assert_eq!(dir.resolve_default_entity().await, 7);
    assert_eq!(dir.resolve_default_entity().await, 7);
    mock.assert_hits(1);
}

#[tokio::test]
async fn scenario_default_entity_falls_back_when_directory_unreachable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/INTEGRACAO/EMPRESAS");
        then.status(500);
    });

    let dir = CompanyDirectory::new(config(&server.base_url(), "k-1"));
    assert_eq!(dir.resolve_default_entity().await, FALLBACK_ENTITY_CODE);
}
