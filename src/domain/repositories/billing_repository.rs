// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::integration_repository::RepositoryError;
use crate::domain::models::billing::{Customer, Payment, Subscription};
use async_trait::async_trait;

/// 账单仓库特质
///
/// 定义Stripe回调维护的本地账单表的数据访问接口
#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// 根据提供商侧客户ID解析本地客户
    async fn find_customer_by_stripe_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<Customer>, RepositoryError>;
    /// 按payment_intent对象ID插入或更新支付记录
    async fn upsert_payment(&self, payment: &Payment) -> Result<Payment, RepositoryError>;
    /// 按subscription对象ID插入或更新订阅记录
    async fn upsert_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, RepositoryError>;
}
