// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::integration_repository::RepositoryError;
use crate::domain::models::webhook::WebhookEndpoint;
use async_trait::async_trait;
use uuid::Uuid;

/// Webhook端点仓库特质
///
/// 定义订阅端点注册的数据访问接口
#[async_trait]
pub trait WebhookEndpointRepository: Send + Sync {
    /// 创建端点
    async fn create(&self, endpoint: &WebhookEndpoint) -> Result<WebhookEndpoint, RepositoryError>;
    /// 根据ID查找端点
    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEndpoint>, RepositoryError>;
    /// 列出全部端点（不过滤）
    async fn find_all(&self) -> Result<Vec<WebhookEndpoint>, RepositoryError>;
    /// 查找订阅了指定事件的活跃端点
    async fn find_active_by_event(
        &self,
        event_name: &str,
    ) -> Result<Vec<WebhookEndpoint>, RepositoryError>;
    /// 按ID硬删除端点
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
