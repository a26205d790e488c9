// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 集成测试辅助模块
//!
//! 提供仓库接口的内存实现，让同步适配器与分发服务在
//! 无数据库的环境下运行。

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use syncrs::config::settings::WebhookSettings;
use syncrs::domain::models::billing::{Customer, Payment, Subscription};
use syncrs::domain::models::integration::{
    Integration, IntegrationLog, IntegrationProvider, LogStatus,
};
use syncrs::domain::models::webhook::{WebhookDelivery, WebhookEndpoint};
use syncrs::domain::repositories::billing_repository::BillingRepository;
use syncrs::domain::repositories::integration_repository::{
    IntegrationChanges, IntegrationRepository, RepositoryError,
};
use syncrs::domain::repositories::webhook_delivery_repository::WebhookDeliveryRepository;
use syncrs::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use syncrs::domain::services::webhook_dispatcher::WebhookDispatcher;
use syncrs::infrastructure::services::webhook_dispatcher_impl::HttpWebhookDispatcher;
use syncrs::providers::traits::SyncContext;
use uuid::Uuid;

/// 测试用Webhook投递配置
pub fn webhook_settings() -> WebhookSettings {
    WebhookSettings {
        max_attempts: 5,
        timeout: 5,
        retry_interval: 1,
    }
}

/// 同步测试装配
///
/// 内存仓库加真实HTTP分发器，适配器在其上完整运行。
pub struct SyncHarness {
    pub integrations: Arc<MemoryIntegrationRepo>,
    pub endpoints: Arc<MemoryEndpointRepo>,
    pub deliveries: Arc<MemoryDeliveryRepo>,
    pub ctx: SyncContext,
}

pub fn sync_harness() -> SyncHarness {
    let integrations = Arc::new(MemoryIntegrationRepo::new());
    let endpoints = Arc::new(MemoryEndpointRepo::new());
    let deliveries = Arc::new(MemoryDeliveryRepo::new());
    let dispatcher: Arc<dyn WebhookDispatcher> = Arc::new(HttpWebhookDispatcher::new(
        endpoints.clone(),
        deliveries.clone(),
        &webhook_settings(),
    ));
    let ctx = SyncContext::new(integrations.clone(), dispatcher);
    SyncHarness {
        integrations,
        endpoints,
        deliveries,
        ctx,
    }
}

/// 植入一条已配置的集成及其凭据
pub async fn seed_integration(
    harness: &SyncHarness,
    provider: IntegrationProvider,
    base_url: &str,
    secret_key: &str,
    secret_value: &str,
) -> Integration {
    let mut integration = Integration::new(provider, provider.to_string());
    integration.config.base_url = Some(base_url.to_string());
    harness.integrations.create(&integration).await.unwrap();
    harness
        .integrations
        .set_secret(integration.id, secret_key, secret_value)
        .await
        .unwrap();
    integration
}

/// 集成仓库的内存实现
#[derive(Default)]
pub struct MemoryIntegrationRepo {
    pub integrations: Mutex<Vec<Integration>>,
    pub secrets: Mutex<HashMap<(Uuid, String), String>>,
    pub logs: Mutex<Vec<IntegrationLog>>,
}

impl MemoryIntegrationRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取指定事件名的日志条数
    pub fn count_logs(&self, event: &str) -> usize {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.event == event)
            .count()
    }
}

#[async_trait]
impl IntegrationRepository for MemoryIntegrationRepo {
    async fn create(&self, integration: &Integration) -> Result<Integration, RepositoryError> {
        self.integrations.lock().unwrap().push(integration.clone());
        Ok(integration.clone())
    }

    async fn find_by_provider(
        &self,
        provider: IntegrationProvider,
    ) -> Result<Option<Integration>, RepositoryError> {
        Ok(self
            .integrations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.provider == provider)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Integration>, RepositoryError> {
        Ok(self
            .integrations
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: IntegrationChanges,
    ) -> Result<Integration, RepositoryError> {
        let mut integrations = self.integrations.lock().unwrap();
        let integration = integrations
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(is_active) = changes.is_active {
            integration.is_active = is_active;
        }
        if let Some(config) = changes.config {
            integration.config = config;
        }
        if let Some(triggers) = changes.triggers {
            integration.triggers = triggers;
        }
        integration.updated_at = chrono::Utc::now();
        Ok(integration.clone())
    }

    async fn set_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        self.secrets
            .lock()
            .unwrap()
            .insert((integration_id, key_name.to_string()), value.to_string());
        Ok(())
    }

    async fn get_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
    ) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .get(&(integration_id, key_name.to_string()))
            .cloned())
    }

    async fn log_execution(
        &self,
        integration_id: Uuid,
        event: &str,
        status: LogStatus,
        payload: JsonValue,
        response: JsonValue,
    ) -> Result<IntegrationLog, RepositoryError> {
        let log = IntegrationLog::new(integration_id, event.to_string(), status, payload, response);
        self.logs.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn find_logs(
        &self,
        integration_id: Uuid,
        limit: u64,
    ) -> Result<Vec<IntegrationLog>, RepositoryError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|l| l.integration_id == integration_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn latest_log(
        &self,
        integration_id: Uuid,
    ) -> Result<Option<IntegrationLog>, RepositoryError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|l| l.integration_id == integration_id)
            .cloned())
    }
}

/// Webhook端点仓库的内存实现
#[derive(Default)]
pub struct MemoryEndpointRepo {
    pub endpoints: Mutex<Vec<WebhookEndpoint>>,
}

impl MemoryEndpointRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookEndpointRepository for MemoryEndpointRepo {
    async fn create(&self, endpoint: &WebhookEndpoint) -> Result<WebhookEndpoint, RepositoryError> {
        self.endpoints.lock().unwrap().push(endpoint.clone());
        Ok(endpoint.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEndpoint>, RepositoryError> {
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<WebhookEndpoint>, RepositoryError> {
        Ok(self.endpoints.lock().unwrap().clone())
    }

    async fn find_active_by_event(
        &self,
        event_name: &str,
    ) -> Result<Vec<WebhookEndpoint>, RepositoryError> {
        Ok(self
            .endpoints
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.is_active && e.subscribes_to(event_name))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut endpoints = self.endpoints.lock().unwrap();
        let before = endpoints.len();
        endpoints.retain(|e| e.id != id);
        if endpoints.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Webhook投递仓库的内存实现
#[derive(Default)]
pub struct MemoryDeliveryRepo {
    pub deliveries: Mutex<Vec<WebhookDelivery>>,
}

impl MemoryDeliveryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookDeliveryRepository for MemoryDeliveryRepo {
    async fn create(&self, delivery: &WebhookDelivery) -> Result<WebhookDelivery, RepositoryError> {
        self.deliveries.lock().unwrap().push(delivery.clone());
        Ok(delivery.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookDelivery>, RepositoryError> {
        Ok(self
            .deliveries
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .cloned())
    }

    async fn find_by_event_id(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<WebhookDelivery>, RepositoryError> {
        Ok(self
            .deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_due_retries(&self, limit: u64) -> Result<Vec<WebhookDelivery>, RepositoryError> {
        let now = chrono::Utc::now();
        let mut due: Vec<WebhookDelivery> = self
            .deliveries
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.next_retry_at.is_some_and(|t| t <= now))
            .cloned()
            .collect();
        due.sort_by_key(|d| d.next_retry_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn update(&self, delivery: &WebhookDelivery) -> Result<WebhookDelivery, RepositoryError> {
        let mut deliveries = self.deliveries.lock().unwrap();
        let stored = deliveries
            .iter_mut()
            .find(|d| d.id == delivery.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = delivery.clone();
        Ok(delivery.clone())
    }
}

/// 账单仓库的内存实现
#[derive(Default)]
pub struct MemoryBillingRepo {
    pub customers: Mutex<Vec<Customer>>,
    pub payments: Mutex<Vec<Payment>>,
    pub subscriptions: Mutex<Vec<Subscription>>,
}

impl MemoryBillingRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BillingRepository for MemoryBillingRepo {
    async fn find_customer_by_stripe_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.stripe_customer_id.as_deref() == Some(stripe_customer_id))
            .cloned())
    }

    async fn upsert_payment(&self, payment: &Payment) -> Result<Payment, RepositoryError> {
        let mut payments = self.payments.lock().unwrap();
        match payments
            .iter_mut()
            .find(|p| p.stripe_payment_intent_id == payment.stripe_payment_intent_id)
        {
            Some(stored) => {
                stored.customer_id = payment.customer_id;
                stored.amount = payment.amount;
                stored.currency = payment.currency.clone();
                stored.status = payment.status.clone();
                Ok(stored.clone())
            }
            None => {
                payments.push(payment.clone());
                Ok(payment.clone())
            }
        }
    }

    async fn upsert_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, RepositoryError> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        match subscriptions
            .iter_mut()
            .find(|s| s.stripe_subscription_id == subscription.stripe_subscription_id)
        {
            Some(stored) => {
                stored.customer_id = subscription.customer_id;
                stored.status = subscription.status.clone();
                stored.current_period_end = subscription.current_period_end;
                stored.updated_at = chrono::Utc::now();
                Ok(stored.clone())
            }
            None => {
                subscriptions.push(subscription.clone());
                Ok(subscription.clone())
            }
        }
    }
}
