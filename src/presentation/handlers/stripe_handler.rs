// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::Settings;
use crate::domain::repositories::billing_repository::BillingRepository;
use crate::domain::services::billing_service::BillingService;
use crate::infrastructure::services::stripe::{StripeVerifyError, StripeWebhookVerifier};
use crate::presentation::errors::AppError;
use crate::presentation::response::accepted;
use axum::{http::HeaderMap, Extension, Json};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// 接收Stripe回调
///
/// 验证Stripe-Signature后按事件类型更新本地账单表；
/// 任何验证失败在任何状态变更之前以400拒绝，未处理的
/// 事件类型接受并忽略。
pub async fn stripe_webhook<R: BillingRepository>(
    Extension(settings): Extension<Arc<Settings>>,
    Extension(billing): Extension<Arc<BillingService<R>>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<JsonValue>, AppError> {
    let secret = settings
        .stripe
        .webhook_secret
        .clone()
        .ok_or(StripeVerifyError::MissingSecret)?;
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(StripeVerifyError::MissingSignature)?;

    let verifier = StripeWebhookVerifier::new(secret);
    let event = verifier.verify(&body, signature)?;

    let outcome = billing.process(&event).await?;
    info!("Processed Stripe event {} ({:?})", event.id, outcome);

    Ok(accepted())
}
