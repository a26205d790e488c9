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

use crate::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use crate::domain::services::webhook_dispatcher::WebhookDispatcher;
use crate::domain::use_cases::create_endpoint::CreateEndpointUseCase;
use crate::presentation::errors::AppError;
use crate::presentation::response::success;
use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 端点创建请求
#[derive(Deserialize, Validate)]
pub struct CreateEndpointPayload {
    /// 回调URL
    #[validate(url)]
    pub url: String,
    /// 订阅的事件名列表（至少一个）
    #[validate(length(min = 1))]
    pub events: Vec<String>,
    /// 描述信息
    pub description: Option<String>,
    /// 创建者标识
    pub created_by: Option<String>,
}

/// 创建订阅端点
///
/// 签名密钥由服务端生成并随创建结果一次性返回
pub async fn create_endpoint<R: WebhookEndpointRepository>(
    Extension(repo): Extension<Arc<R>>,
    Json(payload): Json<CreateEndpointPayload>,
) -> Result<(StatusCode, Json<JsonValue>), AppError> {
    payload.validate()?;

    let use_case = CreateEndpointUseCase::new(repo);
    let endpoint = use_case
        .execute(
            payload.url,
            payload.events,
            payload.description,
            payload.created_by,
        )
        .await?;
    Ok((StatusCode::CREATED, success(endpoint)))
}

/// 列出全部端点
pub async fn list_endpoints<R: WebhookEndpointRepository>(
    Extension(repo): Extension<Arc<R>>,
) -> Result<Json<JsonValue>, AppError> {
    let endpoints = repo.find_all().await?;
    Ok(success(endpoints))
}

/// 按ID硬删除端点
pub async fn delete_endpoint<R: WebhookEndpointRepository>(
    Extension(repo): Extension<Arc<R>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JsonValue>, AppError> {
    repo.delete(id).await?;
    Ok(success(json!({ "deleted": id })))
}

/// 测试分发请求
#[derive(Deserialize)]
pub struct TestDispatchPayload {
    /// 事件名
    pub event: String,
    /// 事件数据
    #[serde(default)]
    pub data: JsonValue,
}

/// 同步触发一次事件分发
///
/// 在请求内完成全部投递并返回摘要
pub async fn test_dispatch(
    Extension(dispatcher): Extension<Arc<dyn WebhookDispatcher>>,
    Json(payload): Json<TestDispatchPayload>,
) -> Result<Json<JsonValue>, AppError> {
    let summary = dispatcher.dispatch(&payload.event, payload.data).await?;
    Ok(success(summary))
}
