// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{seed_integration, sync_harness};
use serde_json::json;
use syncrs::domain::models::integration::{IntegrationProvider, LogStatus};
use syncrs::domain::repositories::integration_repository::IntegrationRepository;
use syncrs::providers::traits::{CrmProvider, PageSummary, SyncError};
use syncrs::providers::zoho::ZohoProvider;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_paginated_sync_follows_next_page_and_stamps_last_sync() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads"))
        .and(query_param("page", "1"))
        .and(header("Authorization", "Zoho-oauthtoken tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "l1"}, {"id": "l2"}],
            "info": {"next_page": {"page": 2}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "l3"}],
            "info": {}
        })))
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
    let outcome = provider.sync().await.unwrap();

    assert_eq!(outcome.count, 3);
    assert_eq!(
        outcome.pages,
        vec![
            PageSummary {
                batch: 1,
                count: 2,
                module: None
            },
            PageSummary {
                batch: 2,
                count: 1,
                module: None
            },
        ]
    );

    // last_sync_at is stamped into the provider-specific config field
    let stored = harness
        .integrations
        .find_by_provider(IntegrationProvider::Zoho)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.config.zoho_last_sync_at.is_some());
    assert!(stored.config.last_sync_at.is_none());

    // One log per page plus the final summary
    assert_eq!(harness.integrations.count_logs("zoho.sync"), 3);
}

#[tokio::test]
async fn test_upstream_error_logs_failed_before_propagating() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
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
    let err = provider.sync().await.unwrap_err();
    assert!(matches!(err, SyncError::Upstream { status: 502, .. }));

    let logs = harness.integrations.logs.lock().unwrap();
    let last = logs.last().unwrap();
    assert_eq!(last.event, "zoho.sync");
    assert_eq!(last.status, LogStatus::Failed);
    assert!(last.response["error"].as_str().unwrap().contains("502"));
}
