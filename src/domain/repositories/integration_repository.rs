// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::{
    Integration, IntegrationConfig, IntegrationLog, IntegrationProvider, LogStatus,
};
use async_trait::async_trait;
use sea_orm::DbErr;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 集成部分更新
///
/// 未设置的字段保持原值；config为整值写入，调用方负责
/// 先读取现有配置合并后再写回。
#[derive(Debug, Default, Clone)]
pub struct IntegrationChanges {
    /// 启用状态变更
    pub is_active: Option<bool>,
    /// 配置变更（整值覆盖）
    pub config: Option<IntegrationConfig>,
    /// 触发事件列表变更
    pub triggers: Option<Vec<String>>,
}

/// 集成仓库特质
///
/// 定义集成注册表、密钥存取与执行日志的数据访问接口
#[async_trait]
pub trait IntegrationRepository: Send + Sync {
    /// 创建集成
    async fn create(&self, integration: &Integration) -> Result<Integration, RepositoryError>;
    /// 根据提供商查找集成（每个提供商至多一行）
    async fn find_by_provider(
        &self,
        provider: IntegrationProvider,
    ) -> Result<Option<Integration>, RepositoryError>;
    /// 根据ID查找集成
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Integration>, RepositoryError>;
    /// 部分更新集成
    async fn update(
        &self,
        id: Uuid,
        changes: IntegrationChanges,
    ) -> Result<Integration, RepositoryError>;
    /// 按(integration_id, key_name)插入或更新密钥
    async fn set_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
        value: &str,
    ) -> Result<(), RepositoryError>;
    /// 读取密钥值
    async fn get_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
    ) -> Result<Option<String>, RepositoryError>;
    /// 追加一条执行日志
    async fn log_execution(
        &self,
        integration_id: Uuid,
        event: &str,
        status: LogStatus,
        payload: JsonValue,
        response: JsonValue,
    ) -> Result<IntegrationLog, RepositoryError>;
    /// 按时间倒序读取执行日志
    async fn find_logs(
        &self,
        integration_id: Uuid,
        limit: u64,
    ) -> Result<Vec<IntegrationLog>, RepositoryError>;
    /// 读取最近一条执行日志
    async fn latest_log(
        &self,
        integration_id: Uuid,
    ) -> Result<Option<IntegrationLog>, RepositoryError>;
}
