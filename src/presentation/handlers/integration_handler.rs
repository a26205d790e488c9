// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::{IntegrationConfig, IntegrationProvider};
use crate::domain::repositories::integration_repository::{
    IntegrationChanges, IntegrationRepository,
};
use crate::domain::services::integration_service::IntegrationService;
use crate::presentation::errors::{AppError, NotFoundError};
use crate::presentation::response::success;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::str::FromStr;
use std::sync::Arc;

/// 日志读取的默认条数
const DEFAULT_LOG_LIMIT: u64 = 50;

fn parse_provider(provider: &str) -> Result<IntegrationProvider, AppError> {
    IntegrationProvider::from_str(provider).map_err(|e| AppError::from(NotFoundError(e)))
}

/// 集成创建请求
#[derive(Deserialize)]
pub struct CreateIntegrationPayload {
    /// 提供商标识
    pub provider: IntegrationProvider,
    /// 展示名称
    pub name: String,
    /// 描述信息
    pub description: Option<String>,
    /// 初始配置
    pub config: Option<IntegrationConfig>,
    /// 订阅的内部事件名列表
    pub triggers: Option<Vec<String>>,
}

/// 创建集成（管理/种子操作）
pub async fn create_integration<R: IntegrationRepository>(
    Extension(service): Extension<Arc<IntegrationService<R>>>,
    Json(payload): Json<CreateIntegrationPayload>,
) -> Result<(StatusCode, Json<JsonValue>), AppError> {
    let integration = service
        .create(
            payload.provider,
            payload.name,
            payload.description,
            payload.config,
            payload.triggers,
        )
        .await?;
    Ok((StatusCode::CREATED, success(integration)))
}

/// 读取集成配置
pub async fn get_integration<R: IntegrationRepository>(
    Extension(service): Extension<Arc<IntegrationService<R>>>,
    Path(provider): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let provider = parse_provider(&provider)?;
    let integration = service.get_by_provider(provider).await?;
    Ok(success(integration))
}

/// 集成更新请求
#[derive(Deserialize)]
pub struct UpdateIntegrationPayload {
    /// 启用状态变更
    pub is_active: Option<bool>,
    /// 配置变更（整值覆盖，调用方负责合并现有配置）
    pub config: Option<IntegrationConfig>,
    /// 触发事件列表变更
    pub triggers: Option<Vec<String>>,
}

/// 部分更新集成
pub async fn update_integration<R: IntegrationRepository>(
    Extension(service): Extension<Arc<IntegrationService<R>>>,
    Path(provider): Path<String>,
    Json(payload): Json<UpdateIntegrationPayload>,
) -> Result<Json<JsonValue>, AppError> {
    let provider = parse_provider(&provider)?;
    let integration = service.get_by_provider(provider).await?;
    let updated = service
        .update(
            integration.id,
            IntegrationChanges {
                is_active: payload.is_active,
                config: payload.config,
                triggers: payload.triggers,
            },
        )
        .await?;
    Ok(success(updated))
}

/// 密钥写入请求
#[derive(Deserialize)]
pub struct SetSecretPayload {
    /// 密钥值
    pub value: String,
}

/// 写入或更新集成密钥
///
/// 响应不回显密钥值
pub async fn set_secret<R: IntegrationRepository>(
    Extension(service): Extension<Arc<IntegrationService<R>>>,
    Path((provider, key)): Path<(String, String)>,
    Json(payload): Json<SetSecretPayload>,
) -> Result<Json<JsonValue>, AppError> {
    let provider = parse_provider(&provider)?;
    let integration = service.get_by_provider(provider).await?;
    service.set_secret(integration.id, &key, &payload.value).await?;
    Ok(success(json!({ "key": key })))
}

/// 日志查询参数
#[derive(Deserialize)]
pub struct LogsQuery {
    /// 返回条数上限
    pub limit: Option<u64>,
}

/// 按时间倒序读取执行日志
pub async fn get_logs<R: IntegrationRepository>(
    Extension(service): Extension<Arc<IntegrationService<R>>>,
    Path(provider): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let provider = parse_provider(&provider)?;
    let integration = service.get_by_provider(provider).await?;
    let logs = service
        .logs(integration.id, query.limit.unwrap_or(DEFAULT_LOG_LIMIT))
        .await?;
    Ok(success(logs))
}
