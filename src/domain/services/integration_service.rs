// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::{
    Integration, IntegrationConfig, IntegrationLog, IntegrationProvider, LogStatus,
};
use crate::domain::repositories::integration_repository::{
    IntegrationChanges, IntegrationRepository, RepositoryError,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 静默写入一条执行日志
///
/// 日志写入失败绝不掩盖或替代主流程的结果：失败只记录
/// 一条警告，不向调用方传播。同步批次日志、入站回调日志
/// 和失败前日志都走这条路径。
///
/// # 参数
///
/// * `repo` - 集成仓库
/// * `integration_id` - 所属集成ID
/// * `event` - 事件名
/// * `status` - 执行状态
/// * `payload` - 事件负载
/// * `response` - 响应数据
pub async fn log_quietly(
    repo: &dyn IntegrationRepository,
    integration_id: Uuid,
    event: &str,
    status: LogStatus,
    payload: JsonValue,
    response: JsonValue,
) {
    if let Err(e) = repo
        .log_execution(integration_id, event, status, payload, response)
        .await
    {
        warn!("Failed to write integration log for {}: {}", event, e);
    }
}

/// 集成服务
///
/// 处理集成注册表的管理操作：查询、部分更新、密钥存取
/// 与执行日志读取。同步适配器直接持有仓库；本服务面向
/// 管理端点。
pub struct IntegrationService<R: IntegrationRepository> {
    repo: Arc<R>,
}

impl<R: IntegrationRepository> IntegrationService<R> {
    /// 创建新的集成服务实例
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 创建一个集成
    ///
    /// 每个提供商至多一行由数据库唯一索引保证；重复创建
    /// 以数据库错误返回。
    pub async fn create(
        &self,
        provider: IntegrationProvider,
        name: String,
        description: Option<String>,
        config: Option<IntegrationConfig>,
        triggers: Option<Vec<String>>,
    ) -> Result<Integration, RepositoryError> {
        let mut integration = Integration::new(provider, name);
        integration.description = description;
        if let Some(config) = config {
            integration.config = config;
        }
        if let Some(triggers) = triggers {
            integration.triggers = triggers;
        }
        self.repo.create(&integration).await
    }

    /// 根据提供商查询集成
    ///
    /// # 返回值
    ///
    /// * `Ok(Integration)` - 集成配置
    /// * `Err(RepositoryError::NotFound)` - 该提供商未配置集成
    pub async fn get_by_provider(
        &self,
        provider: IntegrationProvider,
    ) -> Result<Integration, RepositoryError> {
        self.repo
            .find_by_provider(provider)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// 部分更新集成
    ///
    /// config为整值写入；调用方负责先读取现有配置合并后
    /// 再提交，避免覆盖兄弟键（读-改-写约定）。
    pub async fn update(
        &self,
        id: Uuid,
        changes: IntegrationChanges,
    ) -> Result<Integration, RepositoryError> {
        self.repo.update(id, changes).await
    }

    /// 写入或更新一个集成密钥
    pub async fn set_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        self.repo.set_secret(integration_id, key_name, value).await
    }

    /// 按时间倒序读取执行日志
    pub async fn logs(
        &self,
        integration_id: Uuid,
        limit: u64,
    ) -> Result<Vec<IntegrationLog>, RepositoryError> {
        self.repo.find_logs(integration_id, limit).await
    }
}
