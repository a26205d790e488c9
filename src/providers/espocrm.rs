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
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::info;

/// 凭据键名
const API_KEY: &str = "api_key";

/// 每页记录数
const PAGE_SIZE: usize = 100;

/// EspoCRM分页响应
#[derive(Debug, Deserialize)]
struct EspoPage {
    #[serde(default)]
    list: Vec<JsonValue>,
}

/// EspoCRM同步适配器
///
/// 按limit/offset分页拉取Lead，返回不足一页即为最后一页。
pub struct EspoCrmProvider {
    ctx: SyncContext,
}

impl EspoCrmProvider {
    /// 创建新的EspoCRM适配器
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// 执行分页拉取并盖章
    async fn run(&self, integration: &Integration) -> Result<SyncOutcome, SyncError> {
        let base_url = resolve_base_url(integration)?;
        let api_key = resolve_secret(&self.ctx, integration, API_KEY).await?;

        let url = format!("{}/api/v1/Lead", base_url);
        let mut offset = 0usize;
        let mut batch = 1u32;
        let mut pages = Vec::new();
        let mut total = 0usize;

        loop {
            let response = self
                .ctx
                .client
                .get(&url)
                .query(&[("limit", PAGE_SIZE), ("offset", offset)])
                .header("X-Api-Key", &api_key)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(upstream_error(response).await);
            }

            let body: EspoPage = response.json().await?;
            let count = body.list.len();
            total += count;
            pages.push(PageSummary {
                batch,
                count,
                module: None,
            });

            log_quietly(
                self.ctx.integrations.as_ref(),
                integration.id,
                "espocrm.sync",
                LogStatus::Success,
                json!({"batch": batch, "count": count}),
                json!({}),
            )
            .await;

            if count < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
            batch += 1;
        }

        let synced_at = Utc::now();
        stamp_last_sync(&self.ctx, integration, synced_at).await?;
        log_quietly(
            self.ctx.integrations.as_ref(),
            integration.id,
            "espocrm.sync",
            LogStatus::Success,
            json!({"total": total, "batches": pages.len()}),
            json!({"synced_at": synced_at}),
        )
        .await;
        info!(
            "EspoCRM sync fetched {} records in {} batches",
            total,
            pages.len()
        );

        Ok(SyncOutcome {
            count: total,
            pages,
            synced_at,
        })
    }
}

#[async_trait]
impl CrmProvider for EspoCrmProvider {
    fn provider(&self) -> IntegrationProvider {
        IntegrationProvider::EspoCrm
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
                    "espocrm.sync",
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
