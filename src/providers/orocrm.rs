// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::integration::{Integration, IntegrationProvider, LogStatus};
use crate::domain::services::integration_service::log_quietly;
use crate::providers::traits::{
    announce_completed, resolve_base_url, resolve_integration, resolve_secret, stamp_last_sync,
    upstream_error, CrmProvider, PageSummary, SyncContext, SyncError, SyncOutcome,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tracing::info;

/// 凭据键名
const ACCESS_TOKEN_KEY: &str = "access_token";

/// OroCRM同步适配器
///
/// 单次非分页拉取，四个适配器中最简单的一个。
pub struct OroCrmProvider {
    ctx: SyncContext,
}

impl OroCrmProvider {
    /// 创建新的OroCRM适配器
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// 执行单次拉取并盖章
    async fn run(&self, integration: &Integration) -> Result<SyncOutcome, SyncError> {
        let base_url = resolve_base_url(integration)?;
        let token = resolve_secret(&self.ctx, integration, ACCESS_TOKEN_KEY).await?;

        let url = format!("{}/api/leads", base_url);
        let response = self.ctx.client.get(&url).bearer_auth(&token).send().await?;
        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        let records: Vec<JsonValue> = response.json().await?;
        let count = records.len();

        log_quietly(
            self.ctx.integrations.as_ref(),
            integration.id,
            "orocrm.sync",
            LogStatus::Success,
            json!({"count": count}),
            json!({}),
        )
        .await;

        let synced_at = Utc::now();
        stamp_last_sync(&self.ctx, integration, synced_at).await?;
        info!("OroCRM sync fetched {} records", count);

        Ok(SyncOutcome {
            count,
            pages: vec![PageSummary {
                batch: 1,
                count,
                module: None,
            }],
            synced_at,
        })
    }
}

#[async_trait]
impl CrmProvider for OroCrmProvider {
    fn provider(&self) -> IntegrationProvider {
        IntegrationProvider::OroCrm
    }

    fn context(&self) -> &SyncContext {
        &self.ctx
    }

    async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let integration = resolve_integration(&self.ctx, self.provider()).await?;
        match self.run(&integration).await {
            Ok(outcome) => {
                announce_completed(&self.ctx, self.provider(), &outcome).await;
                Ok(outcome)
            }
            Err(e) => {
                log_quietly(
                    self.ctx.integrations.as_ref(),
                    integration.id,
                    "orocrm.sync",
                    LogStatus::Failed,
                    json!({}),
                    json!({"error": e.to_string()}),
                )
                .await;
                Err(e)
            }
        }
    }
}
