// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::billing::{Payment, Subscription};
use crate::domain::repositories::billing_repository::BillingRepository;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 已验证的Stripe事件
///
/// 签名验证通过后的事件体；data.object为提供商对象原文。
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    /// 事件ID
    pub id: String,
    /// 事件类型（如payment_intent.succeeded）
    #[serde(rename = "type")]
    pub event_type: String,
    /// 事件数据
    pub data: StripeEventData,
}

/// Stripe事件数据容器
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    /// 提供商对象原文
    pub object: JsonValue,
}

/// 一次事件处理的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingOutcome {
    /// 已处理并写入本地账单表
    Processed,
    /// 事件类型未处理，接受并忽略
    Ignored,
}

/// 账单服务
///
/// 将已验证的Stripe事件映射到本地payments/subscriptions表，
/// 按提供商对象ID做upsert；本地客户通过stripe_customer_id
/// 反向关联解析。
pub struct BillingService<R: BillingRepository> {
    repo: Arc<R>,
}

impl<R: BillingRepository> BillingService<R> {
    /// 创建新的账单服务实例
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 处理一个已验证的Stripe事件
    ///
    /// # 参数
    ///
    /// * `event` - 已通过签名验证的事件
    ///
    /// # 返回值
    ///
    /// * `Ok(BillingOutcome)` - 处理结果；未知事件类型返回Ignored
    /// * `Err(anyhow::Error)` - 对象字段缺失或数据库写入失败
    pub async fn process(&self, event: &StripeEvent) -> Result<BillingOutcome> {
        match event.event_type.as_str() {
            "payment_intent.succeeded" => {
                self.upsert_payment(&event.data.object).await?;
                Ok(BillingOutcome::Processed)
            }
            "customer.subscription.created" | "customer.subscription.updated" => {
                self.upsert_subscription(&event.data.object).await?;
                Ok(BillingOutcome::Processed)
            }
            other => {
                info!("Ignoring unhandled Stripe event type: {}", other);
                Ok(BillingOutcome::Ignored)
            }
        }
    }

    /// 从payment_intent对象写入支付记录
    async fn upsert_payment(&self, object: &JsonValue) -> Result<()> {
        let intent_id = require_str(object, "id")?;
        let amount = object
            .get("amount_received")
            .or_else(|| object.get("amount"))
            .and_then(JsonValue::as_i64)
            .ok_or_else(|| anyhow!("payment_intent object has no amount"))?;
        let currency = require_str(object, "currency")?;
        let status = require_str(object, "status")?;

        let customer_id = self.resolve_customer(object).await?;
        let payment = Payment::new(
            customer_id,
            intent_id.to_string(),
            amount,
            currency.to_string(),
            status.to_string(),
        );
        self.repo.upsert_payment(&payment).await?;
        Ok(())
    }

    /// 从subscription对象写入订阅记录
    async fn upsert_subscription(&self, object: &JsonValue) -> Result<()> {
        let subscription_id = require_str(object, "id")?;
        let status = require_str(object, "status")?;
        let current_period_end = object
            .get("current_period_end")
            .and_then(JsonValue::as_i64)
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        let customer_id = self.resolve_customer(object).await?;
        let subscription = Subscription::new(
            customer_id,
            subscription_id.to_string(),
            status.to_string(),
            current_period_end,
        );
        self.repo.upsert_subscription(&subscription).await?;
        Ok(())
    }

    /// 通过对象上的customer字段解析本地客户
    async fn resolve_customer(&self, object: &JsonValue) -> Result<Option<Uuid>> {
        let Some(stripe_customer_id) = object.get("customer").and_then(JsonValue::as_str) else {
            return Ok(None);
        };
        let customer = self
            .repo
            .find_customer_by_stripe_id(stripe_customer_id)
            .await?;
        Ok(customer.map(|c| c.id))
    }
}

/// 读取对象上的必填字符串字段
fn require_str<'a>(object: &'a JsonValue, key: &str) -> Result<&'a str> {
    object
        .get(key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| anyhow!("Stripe object is missing field: {}", key))
}
