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

use crate::config::settings::WebhookSettings;
use crate::domain::models::webhook::{
    truncate_response_body, EventEnvelope, WebhookDelivery, WebhookEndpoint,
};
use crate::domain::repositories::webhook_delivery_repository::WebhookDeliveryRepository;
use crate::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use crate::domain::services::webhook_dispatcher::{DispatchSummary, WebhookDispatcher};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use hmac::{Hmac, Mac};
use metrics::{counter, histogram};
use rand::Rng;
use reqwest::{header, Client};
use serde_json::Value as JsonValue;
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 同一事件的并发投递上限
const MAX_CONCURRENT_DELIVERIES: usize = 10;

type HmacSha256 = Hmac<Sha256>;

/// 为负载计算十六进制HMAC-SHA256签名
pub(crate) fn sign_payload(secret: &str, payload: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// 计算带抖动的指数退避间隔
pub(crate) fn retry_backoff(attempt: i32) -> chrono::Duration {
    let base = 2u64.pow(attempt.max(1) as u32);
    let jitter = rand::rng().random_range(0..base / 2);
    chrono::Duration::seconds((base + jitter) as i64)
}

/// 向单个端点发送一次签名投递
///
/// 网络失败合成500状态，错误信息作为响应体返回；
/// 调用方无条件落库投递结果。
pub(crate) async fn post_signed(
    client: &Client,
    endpoint: &WebhookEndpoint,
    event_name: &str,
    occurred_at: &str,
    payload: &str,
) -> (i32, String) {
    let signature = sign_payload(&endpoint.secret, payload);

    let result = client
        .post(&endpoint.url)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Syncrs-Event", event_name)
        .header("X-Syncrs-Signature", signature)
        .header("X-Syncrs-Timestamp", occurred_at)
        .body(payload.to_string())
        .send()
        .await;

    match result {
        Ok(response) => {
            let status = response.status().as_u16() as i32;
            let body = response.text().await.unwrap_or_default();
            (status, body)
        }
        Err(e) => (500, e.to_string()),
    }
}

/// Webhook分发服务实现
///
/// 按事件名装载活跃订阅端点，对每个端点并发地签名投递
/// 同一信封，并无条件记录投递结果；失败的投递按指数退避
/// 排入重试队列。
pub struct HttpWebhookDispatcher {
    endpoints: Arc<dyn WebhookEndpointRepository>,
    deliveries: Arc<dyn WebhookDeliveryRepository>,
    client: Client,
    max_attempts: i32,
}

impl HttpWebhookDispatcher {
    /// 创建新的Webhook分发服务实现
    ///
    /// # 参数
    ///
    /// * `endpoints` - 端点仓库
    /// * `deliveries` - 投递仓库
    /// * `settings` - Webhook投递配置
    pub fn new(
        endpoints: Arc<dyn WebhookEndpointRepository>,
        deliveries: Arc<dyn WebhookDeliveryRepository>,
        settings: &WebhookSettings,
    ) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Syncrs-Webhook/0.1.0"),
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout))
            .build()
            .unwrap_or_default();

        Self {
            endpoints,
            deliveries,
            client,
            max_attempts: settings.max_attempts,
        }
    }
}

#[async_trait]
impl WebhookDispatcher for HttpWebhookDispatcher {
    async fn dispatch(&self, event_name: &str, data: JsonValue) -> Result<DispatchSummary> {
        let endpoints = self.endpoints.find_active_by_event(event_name).await?;
        if endpoints.is_empty() {
            return Ok(DispatchSummary::empty());
        }

        let envelope = EventEnvelope::new(event_name, data);
        let payload = serde_json::to_value(&envelope)?.to_string();
        let occurred_at = envelope.occurred_at.to_rfc3339();
        let matched = endpoints.len();
        let start = std::time::Instant::now();

        let envelope_ref = &envelope;
        let results: Vec<bool> = futures::stream::iter(endpoints)
            .map(|endpoint| {
                let payload = payload.clone();
                let occurred_at = occurred_at.clone();
                async move {
                    counter!("webhook_delivery_attempts_total").increment(1);
                    let (status, body) = post_signed(
                        &self.client,
                        &endpoint,
                        &envelope_ref.event,
                        &occurred_at,
                        &payload,
                    )
                    .await;

                    let mut delivery = WebhookDelivery::new(endpoint.id, envelope_ref);
                    delivery.response_status = Some(status);
                    delivery.response_body = Some(truncate_response_body(&body));

                    let ok = (200..300).contains(&status);
                    if ok {
                        counter!("webhook_delivery_success_total").increment(1);
                    } else {
                        counter!("webhook_delivery_failed_total").increment(1);
                        if self.max_attempts > 1 {
                            delivery.next_retry_at = Some(Utc::now() + retry_backoff(1));
                        }
                    }

                    // One row per endpoint regardless of outcome
                    if let Err(e) = self.deliveries.create(&delivery).await {
                        error!("Failed to record webhook delivery {}: {}", delivery.id, e);
                    }
                    ok
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DELIVERIES)
            .collect()
            .await;

        histogram!("webhook_dispatch_duration_seconds").record(start.elapsed().as_secs_f64());

        let delivered = results.iter().filter(|ok| **ok).count();
        info!(
            "Dispatched {} to {} endpoints ({} delivered)",
            event_name, matched, delivered
        );

        Ok(DispatchSummary {
            event_id: Some(envelope.event_id),
            matched,
            delivered,
            failed: matched - delivered,
        })
    }
}
