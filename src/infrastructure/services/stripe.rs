// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::billing_service::StripeEvent;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// 签名时间戳容差（秒）
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Stripe签名验证错误类型
///
/// 任何验证失败都在边界处以HTTP 400拒绝，不触发任何
/// 状态变更。
#[derive(Error, Debug)]
pub enum StripeVerifyError {
    /// 缺少Stripe-Signature请求头
    #[error("Missing Stripe-Signature header")]
    MissingSignature,
    /// 未配置Webhook密钥
    #[error("Stripe webhook secret is not configured")]
    MissingSecret,
    /// 签名头格式错误
    #[error("Malformed Stripe-Signature header")]
    MalformedHeader,
    /// 时间戳超出容差
    #[error("Webhook timestamp outside tolerance")]
    StaleTimestamp,
    /// 签名不匹配
    #[error("Webhook signature mismatch")]
    Mismatch,
    /// 事件体解析失败
    #[error("Invalid webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Stripe Webhook签名验证器
///
/// 手动实现签名方案：解析t=/v1=签名头，对"{t}.{body}"计算
/// HMAC-SHA256并做常量时间比较，时间戳容差5分钟。
pub struct StripeWebhookVerifier {
    secret: String,
}

impl StripeWebhookVerifier {
    /// 创建新的验证器
    ///
    /// # 参数
    ///
    /// * `secret` - 端点密钥（whsec_开头的完整字符串）
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// 验证并解析一个入站事件
    ///
    /// # 参数
    ///
    /// * `payload` - 原始请求体
    /// * `signature_header` - Stripe-Signature头的值
    ///
    /// # 返回值
    ///
    /// * `Ok(StripeEvent)` - 验证通过的事件
    /// * `Err(StripeVerifyError)` - 头缺失、过期、签名不匹配或解析失败
    pub fn verify(
        &self,
        payload: &str,
        signature_header: &str,
    ) -> Result<StripeEvent, StripeVerifyError> {
        let (timestamp, expected) = parse_signature_header(signature_header)?;

        let now = Utc::now().timestamp();
        if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(StripeVerifyError::StaleTimestamp);
        }

        let message = format!("{}.{}", timestamp, payload);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| StripeVerifyError::Mismatch)?;

        Ok(serde_json::from_str(payload)?)
    }
}

/// 解析签名头为(时间戳, v1签名字节)
///
/// 头格式：`t=<unix秒>,v1=<hex>[,v0=...]`
fn parse_signature_header(header: &str) -> Result<(i64, Vec<u8>), StripeVerifyError> {
    let mut timestamp: Option<i64> = None;
    let mut v1: Option<Vec<u8>> = None;

    for part in header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" => timestamp = value.parse().ok(),
            "v1" => v1 = hex::decode(value).ok(),
            _ => {}
        }
    }

    match (timestamp, v1) {
        (Some(t), Some(sig)) => Ok((t, sig)),
        _ => Err(StripeVerifyError::MalformedHeader),
    }
}
