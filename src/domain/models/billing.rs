// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 客户实体
///
/// 本地客户记录，通过stripe_customer_id反向关联支付提供商。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// 客户唯一标识符
    pub id: Uuid,
    /// 客户名称
    pub name: String,
    /// 客户邮箱
    pub email: Option<String>,
    /// 支付提供商侧的客户ID
    pub stripe_customer_id: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 支付记录实体
///
/// 由Stripe回调按payment_intent对象ID幂等插入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// 支付唯一标识符
    pub id: Uuid,
    /// 关联的本地客户ID（未解析到时为None）
    pub customer_id: Option<Uuid>,
    /// 提供商侧payment_intent对象ID（唯一键）
    pub stripe_payment_intent_id: String,
    /// 金额（最小货币单位）
    pub amount: i64,
    /// 货币代码
    pub currency: String,
    /// 支付状态
    pub status: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// 创建一条新的支付记录
    pub fn new(
        customer_id: Option<Uuid>,
        stripe_payment_intent_id: String,
        amount: i64,
        currency: String,
        status: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            stripe_payment_intent_id,
            amount,
            currency,
            status,
            created_at: Utc::now(),
        }
    }
}

/// 订阅记录实体
///
/// 由Stripe回调按subscription对象ID进行upsert维护。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// 订阅唯一标识符
    pub id: Uuid,
    /// 关联的本地客户ID（未解析到时为None）
    pub customer_id: Option<Uuid>,
    /// 提供商侧subscription对象ID（唯一键）
    pub stripe_subscription_id: String,
    /// 订阅状态
    pub status: String,
    /// 当前计费周期结束时间
    pub current_period_end: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// 创建一条新的订阅记录
    pub fn new(
        customer_id: Option<Uuid>,
        stripe_subscription_id: String,
        status: String,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            stripe_subscription_id,
            status,
            current_period_end,
            created_at: now,
            updated_at: now,
        }
    }
}
