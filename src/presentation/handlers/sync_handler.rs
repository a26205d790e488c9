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

use crate::domain::models::integration::IntegrationProvider;
use crate::presentation::errors::{AppError, NotFoundError};
use crate::presentation::response::success;
use crate::providers::traits::CrmProvider;
use crate::providers::ProviderRegistry;
use axum::{extract::Path, Extension, Json};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;

/// 解析路径中的提供商并查找其同步适配器
fn resolve_adapter(
    registry: &ProviderRegistry,
    provider: &str,
) -> Result<Arc<dyn CrmProvider>, AppError> {
    let provider = IntegrationProvider::from_str(provider)
        .map_err(|e| AppError::from(NotFoundError(e)))?;
    registry
        .get(provider)
        .ok_or_else(|| AppError::from(NotFoundError(format!("{} has no sync adapter", provider))))
}

/// 触发一次提供商同步
pub async fn trigger_sync(
    Extension(registry): Extension<Arc<ProviderRegistry>>,
    Path(provider): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let adapter = resolve_adapter(&registry, &provider)?;
    let outcome = adapter.sync().await?;
    Ok(success(outcome))
}

/// 读取提供商同步状态
pub async fn sync_status(
    Extension(registry): Extension<Arc<ProviderRegistry>>,
    Path(provider): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let adapter = resolve_adapter(&registry, &provider)?;
    let status = adapter.status().await?;
    Ok(success(status))
}
