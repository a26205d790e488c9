// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::integration_repository::RepositoryError;
use crate::domain::models::webhook::WebhookDelivery;
use async_trait::async_trait;
use uuid::Uuid;

/// Webhook投递仓库特质
///
/// 定义投递记录与重试队列的数据访问接口
#[async_trait]
pub trait WebhookDeliveryRepository: Send + Sync {
    /// 创建投递记录
    async fn create(&self, delivery: &WebhookDelivery) -> Result<WebhookDelivery, RepositoryError>;
    /// 根据ID查找投递记录
    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookDelivery>, RepositoryError>;
    /// 根据事件关联ID查找同一事件的全部投递
    async fn find_by_event_id(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<WebhookDelivery>, RepositoryError>;
    /// 查找到期待重试的投递（next_retry_at <= now）
    async fn find_due_retries(&self, limit: u64) -> Result<Vec<WebhookDelivery>, RepositoryError>;
    /// 更新投递记录
    async fn update(&self, delivery: &WebhookDelivery) -> Result<WebhookDelivery, RepositoryError>;
}
