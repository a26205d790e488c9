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

use crate::domain::models::integration::{Integration, IntegrationLog, IntegrationProvider, LogStatus};
use crate::domain::repositories::integration_repository::{
    IntegrationChanges, IntegrationRepository, RepositoryError,
};
use crate::domain::services::integration_service::log_quietly;
use crate::domain::services::webhook_dispatcher::WebhookDispatcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// 同步错误类型
#[derive(Error, Debug)]
pub enum SyncError {
    /// 集成缺失或配置不完整
    #[error("{0}")]
    NotConfigured(String),
    /// 凭据缺失
    #[error("Missing integration secret: {0}")]
    MissingSecret(String),
    /// 上游API返回非2xx
    #[error("Upstream API error {status}: {body}")]
    Upstream { status: u16, body: String },
    /// 请求失败
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 内部事件广播失败
    #[error("Webhook dispatch failed: {0}")]
    Dispatch(String),
}

/// 单页同步摘要
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageSummary {
    /// 批次编号（从1开始）
    pub batch: u32,
    /// 本批次记录数
    pub count: usize,
    /// 所属模块（SuiteCRM按模块迭代时使用）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

/// 一次同步运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// 拉取到的记录总数
    pub count: usize,
    /// 分页摘要
    pub pages: Vec<PageSummary>,
    /// 同步完成时间
    pub synced_at: DateTime<Utc>,
}

/// 同步状态读取结果
///
/// 未配置的集成返回is_configured=false哨兵而不抛错，
/// 四个提供商行为一致。
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    /// 最近同步时间
    pub last_sync_at: Option<DateTime<Utc>>,
    /// 最近一条执行日志
    pub latest_log: Option<IntegrationLog>,
    /// 是否已配置
    pub is_configured: bool,
}

/// 适配器共享上下文
///
/// 持有仓库、分发器与HTTP客户端，四个适配器共用一份。
#[derive(Clone)]
pub struct SyncContext {
    /// 集成仓库
    pub integrations: Arc<dyn IntegrationRepository>,
    /// Webhook分发器（入站再广播与同步完成事件）
    pub dispatcher: Arc<dyn WebhookDispatcher>,
    /// HTTP客户端
    pub client: reqwest::Client,
}

impl SyncContext {
    /// 创建新的适配器上下文
    ///
    /// # 参数
    ///
    /// * `integrations` - 集成仓库
    /// * `dispatcher` - Webhook分发器
    pub fn new(
        integrations: Arc<dyn IntegrationRepository>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("syncrs/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            integrations,
            dispatcher,
            client,
        }
    }
}

/// CRM提供商适配器特质
///
/// 定义提供商拉取同步的统一接口：解析集成与凭据、分页
/// 拉取、批次日志、last_sync盖章。状态读取和入站回调
/// 处理对全部提供商行为一致，由默认实现提供。
#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// 提供商标识
    fn provider(&self) -> IntegrationProvider;

    /// 共享上下文
    fn context(&self) -> &SyncContext;

    /// 执行一次拉取同步
    ///
    /// # 返回值
    ///
    /// * `Ok(SyncOutcome)` - 分页摘要与完成时间
    /// * `Err(SyncError)` - 配置缺失、上游错误或仓库错误
    async fn sync(&self) -> Result<SyncOutcome, SyncError>;

    /// 读取同步状态
    ///
    /// 未配置的集成返回哨兵而不抛错。
    async fn status(&self) -> Result<SyncStatus, SyncError> {
        let ctx = self.context();
        let Some(integration) = ctx.integrations.find_by_provider(self.provider()).await? else {
            return Ok(SyncStatus {
                last_sync_at: None,
                latest_log: None,
                is_configured: false,
            });
        };
        let latest_log = ctx.integrations.latest_log(integration.id).await?;
        Ok(SyncStatus {
            last_sync_at: integration.config.last_sync(self.provider()),
            latest_log,
            is_configured: integration.config.base_url.is_some(),
        })
    }

    /// 处理入站回调
    ///
    /// 记录原始负载后以提供商前缀事件名再广播。通用提供商
    /// 回调不做签名验证与幂等去重。
    async fn handle_webhook(&self, payload: JsonValue) -> Result<(), SyncError> {
        let ctx = self.context();
        let integration = resolve_integration(ctx, self.provider()).await?;
        let event = format!("{}.webhook", self.provider());
        log_quietly(
            ctx.integrations.as_ref(),
            integration.id,
            &event,
            LogStatus::Success,
            payload.clone(),
            json!({}),
        )
        .await;
        ctx.dispatcher
            .dispatch(&event, payload)
            .await
            .map_err(|e| SyncError::Dispatch(e.to_string()))?;
        Ok(())
    }
}

/// 解析提供商的集成行
///
/// 缺失即为致命配置错误，同步操作不重试。
pub(crate) async fn resolve_integration(
    ctx: &SyncContext,
    provider: IntegrationProvider,
) -> Result<Integration, SyncError> {
    ctx.integrations
        .find_by_provider(provider)
        .await?
        .ok_or_else(|| SyncError::NotConfigured(format!("{} integration is not configured", provider)))
}

/// 解析配置中的基础URL
pub(crate) fn resolve_base_url(integration: &Integration) -> Result<String, SyncError> {
    let raw = integration.config.base_url.as_deref().ok_or_else(|| {
        SyncError::NotConfigured(format!(
            "{} baseUrl is not configured",
            integration.provider
        ))
    })?;
    url::Url::parse(raw).map_err(|_| {
        SyncError::NotConfigured(format!("{} baseUrl is not a valid URL", integration.provider))
    })?;
    Ok(raw.trim_end_matches('/').to_string())
}

/// 解析集成凭据
pub(crate) async fn resolve_secret(
    ctx: &SyncContext,
    integration: &Integration,
    key_name: &str,
) -> Result<String, SyncError> {
    ctx.integrations
        .get_secret(integration.id, key_name)
        .await?
        .ok_or_else(|| SyncError::MissingSecret(key_name.to_string()))
}

/// 盖章最近同步时间
///
/// 在同步开始时读取的配置副本上修改后整值写回；并发写入
/// 遵循行级last-write-wins（无版本列）。
pub(crate) async fn stamp_last_sync(
    ctx: &SyncContext,
    integration: &Integration,
    at: DateTime<Utc>,
) -> Result<(), SyncError> {
    let mut config = integration.config.clone();
    config.stamp_sync(integration.provider, at);
    ctx.integrations
        .update(
            integration.id,
            IntegrationChanges {
                config: Some(config),
                ..Default::default()
            },
        )
        .await?;
    Ok(())
}

/// 广播同步完成事件
///
/// 同步已成功，广播失败只记警告。
pub(crate) async fn announce_completed(
    ctx: &SyncContext,
    provider: IntegrationProvider,
    outcome: &SyncOutcome,
) {
    let event = format!("{}.sync.completed", provider);
    let data = serde_json::to_value(outcome).unwrap_or(JsonValue::Null);
    if let Err(e) = ctx.dispatcher.dispatch(&event, data).await {
        warn!("Failed to dispatch {}: {}", event, e);
    }
}

/// 读取非2xx响应的状态与正文
pub(crate) async fn upstream_error(response: reqwest::Response) -> SyncError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SyncError::Upstream { status, body }
}
