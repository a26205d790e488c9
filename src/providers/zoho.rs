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
const ACCESS_TOKEN_KEY: &str = "access_token";

/// Zoho分页响应
#[derive(Debug, Deserialize)]
struct ZohoPage {
    #[serde(default)]
    data: Vec<JsonValue>,
    info: Option<ZohoPageInfo>,
}

#[derive(Debug, Deserialize)]
struct ZohoPageInfo {
    next_page: Option<ZohoNextPage>,
}

#[derive(Debug, Deserialize)]
struct ZohoNextPage {
    page: u32,
}

/// Zoho同步适配器
///
/// 按page参数分页拉取Leads，响应的info.next_page.page
/// 携带下一页页码，取尽为止。
pub struct ZohoProvider {
    ctx: SyncContext,
}

impl ZohoProvider {
    /// 创建新的Zoho适配器
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// 执行分页拉取并盖章
    async fn run(&self, integration: &Integration) -> Result<SyncOutcome, SyncError> {
        let base_url = resolve_base_url(integration)?;
        let token = resolve_secret(&self.ctx, integration, ACCESS_TOKEN_KEY).await?;

        let url = format!("{}/crm/v2/Leads", base_url);
        let mut page = 1u32;
        let mut batch = 1u32;
        let mut pages = Vec::new();
        let mut total = 0usize;

        loop {
            let response = self
                .ctx
                .client
                .get(&url)
                .query(&[("page", page)])
                .header("Authorization", format!("Zoho-oauthtoken {}", token))
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(upstream_error(response).await);
            }

            let body: ZohoPage = response.json().await?;
            let count = body.data.len();
            total += count;
            pages.push(PageSummary {
                batch,
                count,
                module: None,
            });

            log_quietly(
                self.ctx.integrations.as_ref(),
                integration.id,
                "zoho.sync",
                LogStatus::Success,
                json!({"batch": batch, "count": count}),
                json!({}),
            )
            .await;

            match body.info.and_then(|i| i.next_page) {
                Some(next) => {
                    page = next.page;
                    batch += 1;
                }
                None => break,
            }
        }

        let synced_at = Utc::now();
        stamp_last_sync(&self.ctx, integration, synced_at).await?;
        log_quietly(
            self.ctx.integrations.as_ref(),
            integration.id,
            "zoho.sync",
            LogStatus::Success,
            json!({"total": total, "batches": pages.len()}),
            json!({"synced_at": synced_at}),
        )
        .await;
        info!("Zoho sync fetched {} records in {} batches", total, pages.len());

        Ok(SyncOutcome {
            count: total,
            pages,
            synced_at,
        })
    }
}

#[async_trait]
impl CrmProvider for ZohoProvider {
    fn provider(&self) -> IntegrationProvider {
        IntegrationProvider::Zoho
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
                // Always leave a failed entry before propagating
                log_quietly(
                    self.ctx.integrations.as_ref(),
                    integration.id,
                    "zoho.sync",
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
