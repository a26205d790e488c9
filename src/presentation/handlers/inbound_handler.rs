// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::IntegrationProvider;
use crate::presentation::errors::{AppError, NotFoundError};
use crate::presentation::response::accepted;
use crate::providers::ProviderRegistry;
use axum::{extract::Path, Extension, Json};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;

/// 接收通用提供商入站回调
///
/// 记录原始负载并以提供商前缀事件名再广播；
/// 接收成功一律返回`{success: true}`。
pub async fn receive_webhook(
    Extension(registry): Extension<Arc<ProviderRegistry>>,
    Path(provider): Path<String>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<JsonValue>, AppError> {
    let provider = IntegrationProvider::from_str(&provider)
        .map_err(|e| AppError::from(NotFoundError(e)))?;
    let adapter = registry
        .get(provider)
        .ok_or_else(|| AppError::from(NotFoundError(format!("{} has no webhook handler", provider))))?;

    adapter.handle_webhook(payload).await?;
    Ok(accepted())
}
