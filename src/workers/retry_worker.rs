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
use crate::domain::models::webhook::{truncate_response_body, WebhookDelivery};
use crate::domain::repositories::webhook_delivery_repository::WebhookDeliveryRepository;
use crate::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use crate::infrastructure::services::webhook_dispatcher_impl::{post_signed, retry_backoff};
use chrono::Utc;
use futures::StreamExt;
use metrics::counter;
use reqwest::{header, Client};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// 每轮扫描的投递批量
const BATCH_SIZE: u64 = 50;

/// 重试工作器
///
/// 周期性扫描到期待重试的投递记录，重新签名并投递；
/// 成功清除next_retry_at，失败按指数退避顺延，尝试次数
/// 耗尽后置为死信（next_retry_at为空且状态非2xx）。
#[derive(Clone)]
pub struct RetryWorker<D: WebhookDeliveryRepository, E: WebhookEndpointRepository> {
    /// 投递仓库
    deliveries: Arc<D>,
    /// 端点仓库
    endpoints: Arc<E>,
    /// HTTP客户端
    client: Client,
    /// 单条投递的最大尝试次数
    max_attempts: i32,
    /// 扫描间隔
    interval: Duration,
}

impl<D: WebhookDeliveryRepository, E: WebhookEndpointRepository> RetryWorker<D, E> {
    /// 创建新的重试工作器实例
    ///
    /// # 参数
    ///
    /// * `deliveries` - 投递仓库
    /// * `endpoints` - 端点仓库
    /// * `settings` - Webhook投递配置
    pub fn new(deliveries: Arc<D>, endpoints: Arc<E>, settings: &WebhookSettings) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Syncrs-Webhook/0.1.0"),
        );
        Self {
            deliveries,
            endpoints,
            client: Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(settings.timeout))
                .build()
                .unwrap_or_default(),
            max_attempts: settings.max_attempts,
            interval: Duration::from_secs(settings.retry_interval),
        }
    }

    /// 运行重试工作器
    ///
    /// 启动重试处理循环，定期扫描到期的投递
    pub async fn run(&self) {
        info!("Webhook retry worker started");
        loop {
            if let Err(e) = self.process_due().await {
                error!("Error processing webhook retries: {}", e);
            }
            sleep(self.interval).await;
        }
    }

    /// 处理到期待重试的投递
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 处理成功
    /// * `Err(anyhow::Error)` - 扫描失败
    pub async fn process_due(&self) -> anyhow::Result<()> {
        let due = self.deliveries.find_due_retries(BATCH_SIZE).await?;
        if due.is_empty() {
            return Ok(());
        }

        info!("Retrying {} due webhook deliveries", due.len());

        let worker = self;
        futures::stream::iter(due)
            .for_each_concurrent(10, |delivery| {
                let w = worker;
                async move {
                    if let Err(e) = w.redeliver(delivery).await {
                        error!("Failed to retry webhook delivery: {}", e);
                    }
                }
            })
            .await;

        Ok(())
    }

    /// 重投递一条到期记录
    async fn redeliver(&self, mut delivery: WebhookDelivery) -> anyhow::Result<()> {
        let Some(endpoint) = self.endpoints.find_by_id(delivery.endpoint_id).await? else {
            // Endpoint was hard-deleted; drop the delivery from the queue
            delivery.next_retry_at = None;
            self.deliveries.update(&delivery).await?;
            return Ok(());
        };
        if !endpoint.is_active {
            delivery.next_retry_at = None;
            self.deliveries.update(&delivery).await?;
            return Ok(());
        }

        counter!("webhook_retry_attempts_total").increment(1);
        let payload = delivery.request_payload.to_string();
        let occurred_at = delivery
            .request_payload
            .get("occurred_at")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();

        let (status, body) = post_signed(
            &self.client,
            &endpoint,
            &delivery.event_name,
            &occurred_at,
            &payload,
        )
        .await;

        delivery.attempt += 1;
        delivery.response_status = Some(status);
        delivery.response_body = Some(truncate_response_body(&body));

        if (200..300).contains(&status) {
            delivery.next_retry_at = None;
            counter!("webhook_retry_success_total").increment(1);
            info!("Webhook delivery {} succeeded on retry", delivery.id);
        } else if delivery.attempt >= self.max_attempts {
            // Dead letter: keep the failed status, stop scheduling
            delivery.next_retry_at = None;
            counter!("webhook_retry_dead_total").increment(1);
            info!(
                "Webhook delivery {} gave up after {} attempts",
                delivery.id, delivery.attempt
            );
        } else {
            delivery.next_retry_at = Some(Utc::now() + retry_backoff(delivery.attempt));
            counter!("webhook_retry_failed_total").increment(1);
        }

        self.deliveries.update(&delivery).await?;
        Ok(())
    }
}
