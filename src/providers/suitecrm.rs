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

/// 每页记录数
const PAGE_SIZE: usize = 200;

/// 偏移量安全上限
///
/// 上游API不正确宣告结束时仍保证循环终止。
const MAX_OFFSET: usize = 10_000;

/// 按修改时间增量同步的模块列表
const MODULES: [&str; 2] = ["Leads", "Opportunities"];

/// SuiteCRM分页响应
#[derive(Debug, Deserialize)]
struct SuiteCrmPage {
    #[serde(default)]
    data: Vec<JsonValue>,
}

/// SuiteCRM同步适配器
///
/// 按offset/max_num分页，依次迭代Leads与Opportunities模块，
/// 以date_modified做上次同步以来的增量过滤。整批满页即
/// 继续翻页，偏移量到达安全上限后强制终止。
pub struct SuiteCrmProvider {
    ctx: SyncContext,
}

impl SuiteCrmProvider {
    /// 创建新的SuiteCRM适配器
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// 执行增量拉取并盖章
    async fn run(&self, integration: &Integration) -> Result<SyncOutcome, SyncError> {
        let base_url = resolve_base_url(integration)?;
        let token = resolve_secret(&self.ctx, integration, ACCESS_TOKEN_KEY).await?;
        let modified_after = integration
            .config
            .last_sync(self.provider())
            .map(|t| t.to_rfc3339());

        let mut pages = Vec::new();
        let mut total = 0usize;

        for module in MODULES {
            let url = format!("{}/api/v8/module/{}", base_url, module);
            let mut offset = 0usize;
            let mut batch = 1u32;

            loop {
                let mut request = self
                    .ctx
                    .client
                    .get(&url)
                    .query(&[("offset", offset), ("max_num", PAGE_SIZE)])
                    .bearer_auth(&token);
                if let Some(ref since) = modified_after {
                    request = request.query(&[("modified_after", since.as_str())]);
                }

                let response = request.send().await?;
                if !response.status().is_success() {
                    return Err(upstream_error(response).await);
                }

                let body: SuiteCrmPage = response.json().await?;
                let count = body.data.len();
                total += count;
                pages.push(PageSummary {
                    batch,
                    count,
                    module: Some(module.to_string()),
                });

                log_quietly(
                    self.ctx.integrations.as_ref(),
                    integration.id,
                    "suitecrm.sync",
                    LogStatus::Success,
                    json!({"module": module, "batch": batch, "count": count}),
                    json!({}),
                )
                .await;

                offset += PAGE_SIZE;
                batch += 1;
                // Undersized batch means the module is drained; the offset
                // cap terminates modules that never signal completion.
                if count < PAGE_SIZE || offset >= MAX_OFFSET {
                    break;
                }
            }
        }

        let synced_at = Utc::now();
        stamp_last_sync(&self.ctx, integration, synced_at).await?;
        log_quietly(
            self.ctx.integrations.as_ref(),
            integration.id,
            "suitecrm.sync",
            LogStatus::Success,
            json!({"total": total, "batches": pages.len()}),
            json!({"synced_at": synced_at}),
        )
        .await;
        info!(
            "SuiteCRM sync fetched {} records across {} modules",
            total,
            MODULES.len()
        );

        Ok(SyncOutcome {
            count: total,
            pages,
            synced_at,
        })
    }
}

#[async_trait]
impl CrmProvider for SuiteCrmProvider {
    fn provider(&self) -> IntegrationProvider {
        IntegrationProvider::SuiteCrm
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
                    "suitecrm.sync",
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
