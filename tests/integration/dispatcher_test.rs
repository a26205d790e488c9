// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::helpers::{seed_integration, sync_harness, webhook_settings, MemoryDeliveryRepo, MemoryEndpointRepo};
use serde_json::json;
use std::sync::Arc;
use syncrs::domain::models::integration::IntegrationProvider;
use syncrs::domain::models::webhook::WebhookEndpoint;
use syncrs::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use syncrs::domain::services::webhook_dispatcher::WebhookDispatcher;
use syncrs::infrastructure::services::webhook_dispatcher_impl::HttpWebhookDispatcher;
use syncrs::providers::traits::CrmProvider;
use syncrs::providers::zoho::ZohoProvider;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher_with(
    endpoints: Arc<MemoryEndpointRepo>,
    deliveries: Arc<MemoryDeliveryRepo>,
) -> HttpWebhookDispatcher {
    HttpWebhookDispatcher::new(endpoints, deliveries, &webhook_settings())
}

async fn register_endpoint(
    repo: &MemoryEndpointRepo,
    url: String,
    events: Vec<&str>,
) -> WebhookEndpoint {
    let endpoint = WebhookEndpoint::new(
        url,
        events.into_iter().map(String::from).collect(),
        None,
        None,
    );
    repo.create(&endpoint).await.unwrap()
}

#[tokio::test]
async fn test_fan_out_writes_one_delivery_per_endpoint_with_shared_event_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook-a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook-b"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook-c"))
        .respond_with(ResponseTemplate::new(500).set_body_string("subscriber down"))
        .mount(&server)
        .await;

    let endpoints = Arc::new(MemoryEndpointRepo::new());
    let deliveries = Arc::new(MemoryDeliveryRepo::new());
    for p in ["/hook-a", "/hook-b", "/hook-c"] {
        register_endpoint(&endpoints, format!("{}{}", server.uri(), p), vec!["deal.created"]).await;
    }
    // An endpoint subscribed to a different event stays untouched
    register_endpoint(&endpoints, format!("{}/other", server.uri()), vec!["lead.created"]).await;

    let dispatcher = dispatcher_with(endpoints, deliveries.clone());
    let summary = dispatcher
        .dispatch("deal.created", json!({"id": "d1"}))
        .await
        .unwrap();

    assert_eq!(summary.matched, 3);
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.failed, 1);

    let rows = deliveries.deliveries.lock().unwrap();
    assert_eq!(rows.len(), 3);
    let event_id = rows[0].event_id;
    assert!(rows.iter().all(|d| d.event_id == event_id));
    assert!(rows.iter().all(|d| d.event_name == "deal.created"));

    // The failed delivery is scheduled for retry, successes are not
    let failed: Vec<_> = rows.iter().filter(|d| !d.is_success()).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].next_retry_at.is_some());
    assert_eq!(failed[0].response_body.as_deref(), Some("subscriber down"));
    assert!(rows
        .iter()
        .filter(|d| d.is_success())
        .all(|d| d.next_retry_at.is_none()));
}

#[tokio::test]
async fn test_delivery_carries_signed_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("X-Syncrs-Event", "deal.created"))
        .and(header_exists("X-Syncrs-Signature"))
        .and(header_exists("X-Syncrs-Timestamp"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let endpoints = Arc::new(MemoryEndpointRepo::new());
    let deliveries = Arc::new(MemoryDeliveryRepo::new());
    register_endpoint(&endpoints, format!("{}/hook", server.uri()), vec!["deal.created"]).await;

    let dispatcher = dispatcher_with(endpoints, deliveries.clone());
    let summary = dispatcher
        .dispatch("deal.created", json!({"id": "d1"}))
        .await
        .unwrap();
    assert_eq!(summary.delivered, 1);

    let rows = deliveries.deliveries.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].response_status, Some(200));
    assert_eq!(rows[0].request_payload["event"], "deal.created");
    assert_eq!(rows[0].request_payload["data"]["id"], "d1");
    assert!(rows[0].request_payload["event_id"].is_string());
    assert!(rows[0].request_payload["occurred_at"].is_string());
    assert_eq!(rows[0].attempt, 1);
}

#[tokio::test]
async fn test_dispatch_without_subscribers_is_a_no_op() {
    let endpoints = Arc::new(MemoryEndpointRepo::new());
    let deliveries = Arc::new(MemoryDeliveryRepo::new());

    let dispatcher = dispatcher_with(endpoints, deliveries.clone());
    let summary = dispatcher
        .dispatch("deal.created", json!({"id": "d1"}))
        .await
        .unwrap();

    assert_eq!(summary.matched, 0);
    assert!(summary.event_id.is_none());
    assert!(deliveries.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_records_synthesized_500() {
    let endpoints = Arc::new(MemoryEndpointRepo::new());
    let deliveries = Arc::new(MemoryDeliveryRepo::new());
    // Nothing listens on this port
    register_endpoint(
        &endpoints,
        "http://127.0.0.1:1/hook".to_string(),
        vec!["deal.created"],
    )
    .await;

    let dispatcher = dispatcher_with(endpoints, deliveries.clone());
    let summary = dispatcher
        .dispatch("deal.created", json!({"id": "d1"}))
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    let rows = deliveries.deliveries.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].response_status, Some(500));
    assert!(rows[0].response_body.as_deref().is_some_and(|b| !b.is_empty()));
}

#[tokio::test]
async fn test_inbound_webhook_logs_and_rebroadcasts() {
    let receiver = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscriber"))
        .and(header("X-Syncrs-Event", "zoho.webhook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&receiver)
        .await;

    let harness = sync_harness();
    seed_integration(
        &harness,
        IntegrationProvider::Zoho,
        "https://crm.example.com",
        "access_token",
        "tok-1",
    )
    .await;
    register_endpoint(
        &harness.endpoints,
        format!("{}/subscriber", receiver.uri()),
        vec!["zoho.webhook"],
    )
    .await;

    let provider = ZohoProvider::new(harness.ctx.clone());
    provider
        .handle_webhook(json!({"module": "Leads", "id": "l9"}))
        .await
        .unwrap();

    // Raw payload is logged before the internal re-broadcast
    assert_eq!(harness.integrations.count_logs("zoho.webhook"), 1);
    let rows = harness.deliveries.deliveries.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].event_name, "zoho.webhook");
    assert_eq!(rows[0].request_payload["data"]["id"], "l9");
}
