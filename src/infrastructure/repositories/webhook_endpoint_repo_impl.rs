// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::WebhookEndpoint;
use crate::domain::repositories::integration_repository::RepositoryError;
use crate::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use crate::infrastructure::database::entities::webhook_endpoint;
use async_trait::async_trait;
use sea_orm::*;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use uuid::Uuid;

/// Webhook端点仓库实现
#[derive(Clone)]
pub struct WebhookEndpointRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WebhookEndpointRepoImpl {
    /// 创建新的Webhook端点仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<webhook_endpoint::Model> for WebhookEndpoint {
    fn from(model: webhook_endpoint::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            events: serde_json::from_value(model.events).unwrap_or_default(),
            description: model.description,
            secret: model.secret,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at.into(),
        }
    }
}

#[async_trait]
impl WebhookEndpointRepository for WebhookEndpointRepoImpl {
    async fn create(&self, endpoint: &WebhookEndpoint) -> Result<WebhookEndpoint, RepositoryError> {
        let model = webhook_endpoint::ActiveModel {
            id: Set(endpoint.id),
            url: Set(endpoint.url.clone()),
            events: Set(JsonValue::from(endpoint.events.clone())),
            description: Set(endpoint.description.clone()),
            secret: Set(endpoint.secret.clone()),
            is_active: Set(endpoint.is_active),
            created_by: Set(endpoint.created_by.clone()),
            created_at: Set(endpoint.created_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(endpoint.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEndpoint>, RepositoryError> {
        let model = webhook_endpoint::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<WebhookEndpoint>, RepositoryError> {
        let models = webhook_endpoint::Entity::find()
            .order_by_asc(webhook_endpoint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_active_by_event(
        &self,
        event_name: &str,
    ) -> Result<Vec<WebhookEndpoint>, RepositoryError> {
        // JSON array membership is filtered in Rust to stay portable
        // across Postgres and SQLite
        let models = webhook_endpoint::Entity::find()
            .filter(webhook_endpoint::Column::IsActive.eq(true))
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .map(WebhookEndpoint::from)
            .filter(|e| e.subscribes_to(event_name))
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = webhook_endpoint::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
