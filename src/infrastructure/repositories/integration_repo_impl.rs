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

use crate::domain::models::integration::{
    Integration, IntegrationLog, IntegrationProvider, LogStatus,
};
use crate::domain::repositories::integration_repository::{
    IntegrationChanges, IntegrationRepository, RepositoryError,
};
use crate::infrastructure::database::entities::{integration, integration_log, integration_secret};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// 集成仓库实现
#[derive(Clone)]
pub struct IntegrationRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl IntegrationRepoImpl {
    /// 创建新的集成仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// 实体行转领域模型
///
/// provider与config列由应用写入，不合法的值按损坏数据处理。
fn to_domain(model: integration::Model) -> Result<Integration, RepositoryError> {
    let provider = IntegrationProvider::from_str(&model.provider)
        .map_err(|e| RepositoryError::Database(DbErr::Custom(e)))?;
    let config = serde_json::from_value(model.config).map_err(|e| {
        RepositoryError::Database(DbErr::Custom(format!("Invalid integration config: {}", e)))
    })?;
    let triggers: Vec<String> = serde_json::from_value(model.triggers).map_err(|e| {
        RepositoryError::Database(DbErr::Custom(format!("Invalid integration triggers: {}", e)))
    })?;

    Ok(Integration {
        id: model.id,
        name: model.name,
        provider,
        description: model.description,
        is_active: model.is_active,
        config,
        triggers,
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    })
}

impl From<integration_log::Model> for IntegrationLog {
    fn from(model: integration_log::Model) -> Self {
        let status = match model.status.as_str() {
            "failed" => LogStatus::Failed,
            _ => LogStatus::Success,
        };
        Self {
            id: model.id,
            integration_id: model.integration_id,
            event: model.event,
            status,
            payload: model.payload,
            response: model.response,
            created_at: model.created_at.into(),
        }
    }
}

#[async_trait]
impl IntegrationRepository for IntegrationRepoImpl {
    async fn create(&self, item: &Integration) -> Result<Integration, RepositoryError> {
        let config = serde_json::to_value(&item.config).map_err(|e| {
            RepositoryError::Database(DbErr::Custom(format!("Invalid integration config: {}", e)))
        })?;
        let model = integration::ActiveModel {
            id: Set(item.id),
            name: Set(item.name.clone()),
            provider: Set(item.provider.to_string()),
            description: Set(item.description.clone()),
            is_active: Set(item.is_active),
            config: Set(config),
            triggers: Set(JsonValue::from(item.triggers.clone())),
            created_at: Set(item.created_at.into()),
            updated_at: Set(item.updated_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(item.clone())
    }

    async fn find_by_provider(
        &self,
        provider: IntegrationProvider,
    ) -> Result<Option<Integration>, RepositoryError> {
        let model = integration::Entity::find()
            .filter(integration::Column::Provider.eq(provider.to_string()))
            .one(self.db.as_ref())
            .await?;

        model.map(to_domain).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Integration>, RepositoryError> {
        let model = integration::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        model.map(to_domain).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: IntegrationChanges,
    ) -> Result<Integration, RepositoryError> {
        let mut active: integration::ActiveModel = integration::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?
            .into();

        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(config) = changes.config {
            let value = serde_json::to_value(&config).map_err(|e| {
                RepositoryError::Database(DbErr::Custom(format!(
                    "Invalid integration config: {}",
                    e
                )))
            })?;
            active.config = Set(value);
        }
        if let Some(triggers) = changes.triggers {
            active.triggers = Set(JsonValue::from(triggers));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(self.db.as_ref()).await?;
        to_domain(updated)
    }

    async fn set_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        let existing = integration_secret::Entity::find()
            .filter(integration_secret::Column::IntegrationId.eq(integration_id))
            .filter(integration_secret::Column::KeyName.eq(key_name))
            .one(self.db.as_ref())
            .await?;

        match existing {
            Some(model) => {
                let mut active: integration_secret::ActiveModel = model.into();
                active.value = Set(value.to_string());
                active.updated_at = Set(Utc::now().into());
                active.update(self.db.as_ref()).await?;
            }
            None => {
                let model = integration_secret::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    integration_id: Set(integration_id),
                    key_name: Set(key_name.to_string()),
                    value: Set(value.to_string()),
                    updated_at: Set(Utc::now().into()),
                };
                model.insert(self.db.as_ref()).await?;
            }
        }

        Ok(())
    }

    async fn get_secret(
        &self,
        integration_id: Uuid,
        key_name: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let model = integration_secret::Entity::find()
            .filter(integration_secret::Column::IntegrationId.eq(integration_id))
            .filter(integration_secret::Column::KeyName.eq(key_name))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(|m| m.value))
    }

    async fn log_execution(
        &self,
        integration_id: Uuid,
        event: &str,
        status: LogStatus,
        payload: JsonValue,
        response: JsonValue,
    ) -> Result<IntegrationLog, RepositoryError> {
        let log = IntegrationLog::new(integration_id, event.to_string(), status, payload, response);
        let model = integration_log::ActiveModel {
            id: Set(log.id),
            integration_id: Set(log.integration_id),
            event: Set(log.event.clone()),
            status: Set(log.status.to_string()),
            payload: Set(log.payload.clone()),
            response: Set(log.response.clone()),
            created_at: Set(log.created_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(log)
    }

    async fn find_logs(
        &self,
        integration_id: Uuid,
        limit: u64,
    ) -> Result<Vec<IntegrationLog>, RepositoryError> {
        let models = integration_log::Entity::find()
            .filter(integration_log::Column::IntegrationId.eq(integration_id))
            .order_by_desc(integration_log::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn latest_log(
        &self,
        integration_id: Uuid,
    ) -> Result<Option<IntegrationLog>, RepositoryError> {
        let model = integration_log::Entity::find()
            .filter(integration_log::Column::IntegrationId.eq(integration_id))
            .order_by_desc(integration_log::Column::CreatedAt)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }
}
