// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// 一次事件分发的结果摘要
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    /// 事件关联ID，无匹配端点时为None
    pub event_id: Option<Uuid>,
    /// 匹配到的端点数
    pub matched: usize,
    /// 成功投递数（2xx响应）
    pub delivered: usize,
    /// 失败投递数
    pub failed: usize,
}

impl DispatchSummary {
    /// 无匹配端点时的空摘要
    pub fn empty() -> Self {
        Self {
            event_id: None,
            matched: 0,
            delivered: 0,
            failed: 0,
        }
    }
}

/// Webhook分发服务特质
///
/// 定义内部事件向订阅端点广播的核心契约：一次dispatch
/// 对每个匹配端点产生一条投递记录，单个端点的失败不
/// 影响其余端点。
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// 分发一个内部事件
    ///
    /// # 参数
    ///
    /// * `event_name` - 事件名（集合成员匹配）
    /// * `data` - 事件数据
    ///
    /// # 返回值
    ///
    /// * `Ok(DispatchSummary)` - 全部投递已记录后的摘要
    /// * `Err(anyhow::Error)` - 端点查询或信封序列化失败
    async fn dispatch(&self, event_name: &str, data: JsonValue) -> Result<DispatchSummary>;
}
