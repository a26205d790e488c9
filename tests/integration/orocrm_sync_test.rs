// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{seed_integration, sync_harness};
use serde_json::json;
use syncrs::domain::models::integration::IntegrationProvider;
use syncrs::domain::repositories::integration_repository::IntegrationRepository;
use syncrs::providers::orocrm::OroCrmProvider;
use syncrs::providers::traits::{CrmProvider, SyncError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_single_unpaginated_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1}, {"id": 2}, {"id": 3}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let harness = sync_harness();
    seed_integration(
        &harness,
        IntegrationProvider::OroCrm,
        &server.uri(),
        "access_token",
        "tok-1",
    )
    .await;

    let provider = OroCrmProvider::new(harness.ctx.clone());
    let outcome = provider.sync().await.unwrap();

    assert_eq!(outcome.count, 3);
    assert_eq!(outcome.pages.len(), 1);

    let stored = harness
        .integrations
        .find_by_provider(IntegrationProvider::OroCrm)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.config.orocrm_last_sync_at.is_some());
}

#[tokio::test]
async fn test_upstream_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired token"))
        .mount(&server)
        .await;

    let harness = sync_harness();
    seed_integration(
        &harness,
        IntegrationProvider::OroCrm,
        &server.uri(),
        "access_token",
        "tok-1",
    )
    .await;

    let provider = OroCrmProvider::new(harness.ctx.clone());
    let err = provider.sync().await.unwrap_err();
    match err {
        SyncError::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "expired token");
        }
        other => panic!("expected Upstream error, got {:?}", other),
    }
}
