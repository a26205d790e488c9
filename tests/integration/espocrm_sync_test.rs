// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{seed_integration, sync_harness};
use serde_json::{json, Value as JsonValue};
use syncrs::domain::models::integration::IntegrationProvider;
use syncrs::domain::repositories::integration_repository::IntegrationRepository;
use syncrs::providers::espocrm::EspoCrmProvider;
use syncrs::providers::traits::CrmProvider;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn records(count: usize) -> Vec<JsonValue> {
    (0..count).map(|i| json!({"id": i})).collect()
}

#[tokio::test]
async fn test_pagination_terminates_on_undersized_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/Lead"))
        .and(query_param("offset", "0"))
        .and(header("X-Api-Key", "key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": records(100)})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/Lead"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": records(40)})))
        .mount(&server)
        .await;

    let harness = sync_harness();
    seed_integration(
        &harness,
        IntegrationProvider::EspoCrm,
        &server.uri(),
        "api_key",
        "key-1",
    )
    .await;

    let provider = EspoCrmProvider::new(harness.ctx.clone());
    let outcome = provider.sync().await.unwrap();

    // Total records logged across pages equals the sum of page sizes
    assert_eq!(outcome.count, 140);
    assert_eq!(outcome.pages.len(), 2);
    assert_eq!(outcome.pages[0].count, 100);
    assert_eq!(outcome.pages[1].count, 40);

    let stored = harness
        .integrations
        .find_by_provider(IntegrationProvider::EspoCrm)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.config.espocrm_last_sync_at.is_some());

    // Two page logs plus the summary entry
    assert_eq!(harness.integrations.count_logs("espocrm.sync"), 3);
}

#[tokio::test]
async fn test_single_short_page_completes_in_one_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/Lead"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": records(7)})))
        .mount(&server)
        .await;

    let harness = sync_harness();
    seed_integration(
        &harness,
        IntegrationProvider::EspoCrm,
        &server.uri(),
        "api_key",
        "key-1",
    )
    .await;

    let provider = EspoCrmProvider::new(harness.ctx.clone());
    let outcome = provider.sync().await.unwrap();
    assert_eq!(outcome.count, 7);
    assert_eq!(outcome.pages.len(), 1);
}
