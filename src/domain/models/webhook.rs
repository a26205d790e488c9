// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// 持久化响应体的最大长度（字符）
pub const RESPONSE_BODY_LIMIT: usize = 1000;

/// 截断响应体
///
/// 落库前将订阅方响应体截断到固定长度，避免日志表被
/// 超大响应撑爆。
pub fn truncate_response_body(body: &str) -> String {
    body.chars().take(RESPONSE_BODY_LIMIT).collect()
}

/// Webhook端点实体
///
/// 表示一个订阅方注册，用于接收内部事件的推送通知。
/// 创建时服务端生成32字节十六进制签名密钥，UI负责
/// 一次性展示给调用方。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    /// 端点唯一标识符
    pub id: Uuid,
    /// 回调URL
    pub url: String,
    /// 订阅的事件名列表（集合成员匹配，不做模式匹配）
    pub events: Vec<String>,
    /// 描述信息
    pub description: Option<String>,
    /// 签名密钥（服务端生成）
    pub secret: String,
    /// 是否启用
    pub is_active: bool,
    /// 创建者
    pub created_by: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl WebhookEndpoint {
    /// 创建一个新的Webhook端点
    ///
    /// # 参数
    ///
    /// * `url` - 回调URL
    /// * `events` - 订阅的事件名列表
    /// * `description` - 描述信息
    /// * `created_by` - 创建者标识
    ///
    /// # 返回值
    ///
    /// 返回一个新的端点实例，包含服务端生成的签名密钥
    pub fn new(
        url: String,
        events: Vec<String>,
        description: Option<String>,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            events,
            description,
            secret: generate_secret(),
            is_active: true,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// 判断端点是否订阅了指定事件
    pub fn subscribes_to(&self, event_name: &str) -> bool {
        self.events.iter().any(|e| e == event_name)
    }
}

/// 生成32字节随机密钥的十六进制表示
fn generate_secret() -> String {
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// 事件信封
///
/// 一次dispatch调用构造一个信封，投递到所有匹配端点；
/// event_id在同一事件的全部投递间共享，用于关联。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// 事件名
    pub event: String,
    /// 事件关联ID（每次dispatch生成一次）
    pub event_id: Uuid,
    /// 事件发生时间（ISO-8601）
    pub occurred_at: DateTime<Utc>,
    /// 事件数据
    pub data: JsonValue,
}

impl EventEnvelope {
    /// 构造一个新的事件信封
    pub fn new(event: impl Into<String>, data: JsonValue) -> Self {
        Self {
            event: event.into(),
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            data,
        }
    }
}

/// Webhook投递记录实体
///
/// 一次dispatch对一个端点的一次HTTP POST尝试及其结果。
/// 无论成败都会落库一行；失败的投递由重试工作器按
/// next_retry_at调度重发。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookDelivery {
    /// 投递唯一标识符
    pub id: Uuid,
    /// 目标端点ID
    pub endpoint_id: Uuid,
    /// 事件关联ID（同一事件的所有投递共享）
    pub event_id: Uuid,
    /// 事件名
    pub event_name: String,
    /// 投递的请求负载（完整信封）
    pub request_payload: JsonValue,
    /// HTTP响应状态码（网络失败时合成500）
    pub response_status: Option<i32>,
    /// 响应体（截断到1000字符）
    pub response_body: Option<String>,
    /// 已尝试次数
    pub attempt: i32,
    /// 下次重试时间，None表示不再重试
    pub next_retry_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl WebhookDelivery {
    /// 创建一条新的投递记录
    ///
    /// # 参数
    ///
    /// * `endpoint_id` - 目标端点ID
    /// * `envelope` - 投递的事件信封
    pub fn new(endpoint_id: Uuid, envelope: &EventEnvelope) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            endpoint_id,
            event_id: envelope.event_id,
            event_name: envelope.event.clone(),
            request_payload: serde_json::to_value(envelope).unwrap_or(JsonValue::Null),
            response_status: None,
            response_body: None,
            attempt: 1,
            next_retry_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 判断本次投递是否成功（2xx响应）
    pub fn is_success(&self) -> bool {
        self.response_status
            .is_some_and(|s| (200..300).contains(&s))
    }
}
