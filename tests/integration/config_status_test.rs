// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{seed_integration, sync_harness};
use serde_json::json;
use syncrs::domain::models::integration::{Integration, IntegrationProvider};
use syncrs::domain::repositories::integration_repository::IntegrationRepository;
use syncrs::providers::traits::{CrmProvider, SyncError};
use syncrs::providers::zoho::ZohoProvider;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_sync_fails_fast_when_integration_is_absent() {
    let harness = sync_harness();
    let provider = ZohoProvider::new(harness.ctx.clone());

    let err = provider.sync().await.unwrap_err();
    assert!(matches!(err, SyncError::NotConfigured(_)));
    assert!(err.to_string().contains("zoho"));
}

#[tokio::test]
async fn test_sync_fails_fast_when_base_url_is_missing() {
    let harness = sync_harness();
    let integration = Integration::new(IntegrationProvider::Zoho, "zoho".to_string());
    harness.integrations.create(&integration).await.unwrap();
    harness
        .integrations
        .set_secret(integration.id, "access_token", "tok-1")
        .await
        .unwrap();

    let provider = ZohoProvider::new(harness.ctx.clone());
    let err = provider.sync().await.unwrap_err();
    assert!(matches!(err, SyncError::NotConfigured(_)));
    assert!(err.to_string().contains("baseUrl"));
}

#[tokio::test]
async fn test_sync_fails_fast_before_any_http_call_when_secret_is_missing() {
    let server = MockServer::start().await;
    // The configuration error must surface before any request is attempted
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let harness = sync_harness();
    let mut integration = Integration::new(IntegrationProvider::Zoho, "zoho".to_string());
    integration.config.base_url = Some(server.uri());
    harness.integrations.create(&integration).await.unwrap();

    let provider = ZohoProvider::new(harness.ctx.clone());
    let err = provider.sync().await.unwrap_err();
    match err {
        SyncError::MissingSecret(key) => assert_eq!(key, "access_token"),
        other => panic!("expected MissingSecret, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_returns_sentinel_for_unconfigured_provider() {
    let harness = sync_harness();
    let provider = ZohoProvider::new(harness.ctx.clone());

    let status = provider.status().await.unwrap();
    assert!(!status.is_configured);
    assert!(status.last_sync_at.is_none());
    assert!(status.latest_log.is_none());
}

#[tokio::test]
async fn test_status_read_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "info": {}})))
        .mount(&server)
        .await;

    let harness = sync_harness();
    seed_integration(
        &harness,
        IntegrationProvider::Zoho,
        &server.uri(),
        "access_token",
        "tok-1",
    )
    .await;

    let provider = ZohoProvider::new(harness.ctx.clone());
    provider.sync().await.unwrap();

    let first = provider.status().await.unwrap();
    let second = provider.status().await.unwrap();

    assert!(first.is_configured);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn test_config_merge_preserves_unknown_sibling_keys() {
    let harness = sync_harness();
    let mut integration = Integration::new(IntegrationProvider::Zoho, "zoho".to_string());
    integration.config.base_url = Some("https://crm.example.com".to_string());
    integration
        .config
        .extra
        .insert("region".to_string(), json!("eu-1"));
    harness.integrations.create(&integration).await.unwrap();

    // Round-trip through serde the way the SeaORM repository stores it
    let stored = serde_json::to_value(&integration.config).unwrap();
    let reloaded: syncrs::domain::models::integration::IntegrationConfig =
        serde_json::from_value(stored).unwrap();
    assert_eq!(reloaded.extra.get("region"), Some(&json!("eu-1")));
    assert_eq!(reloaded.base_url.as_deref(), Some("https://crm.example.com"));
}
