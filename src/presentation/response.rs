// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// 构造标准成功信封
///
/// 全应用统一的响应形状：`{"success": true, "data": ...}`；
/// 错误路径由AppError产出`{"success": false, "error": ...}`。
pub fn success<T: Serialize>(data: T) -> Json<JsonValue> {
    Json(json!({ "success": true, "data": data }))
}

/// 构造无数据的接收确认信封
pub fn accepted() -> Json<JsonValue> {
    Json(json!({ "success": true }))
}
