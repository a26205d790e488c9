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

use crate::domain::models::webhook::WebhookDelivery;
use crate::domain::repositories::integration_repository::RepositoryError;
use crate::domain::repositories::webhook_delivery_repository::WebhookDeliveryRepository;
use crate::infrastructure::database::entities::webhook_delivery;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// Webhook投递仓库实现
#[derive(Clone)]
pub struct WebhookDeliveryRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WebhookDeliveryRepoImpl {
    /// 创建新的Webhook投递仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<webhook_delivery::Model> for WebhookDelivery {
    fn from(model: webhook_delivery::Model) -> Self {
        Self {
            id: model.id,
            endpoint_id: model.endpoint_id,
            event_id: model.event_id,
            event_name: model.event_name,
            request_payload: model.request_payload,
            response_status: model.response_status.map(|s| s as i32),
            response_body: model.response_body,
            attempt: model.attempt,
            next_retry_at: model.next_retry_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[async_trait]
impl WebhookDeliveryRepository for WebhookDeliveryRepoImpl {
    async fn create(&self, delivery: &WebhookDelivery) -> Result<WebhookDelivery, RepositoryError> {
        let model = webhook_delivery::ActiveModel {
            id: Set(delivery.id),
            endpoint_id: Set(delivery.endpoint_id),
            event_id: Set(delivery.event_id),
            event_name: Set(delivery.event_name.clone()),
            request_payload: Set(delivery.request_payload.clone()),
            response_status: Set(delivery.response_status.map(|s| s as i16)),
            response_body: Set(delivery.response_body.clone()),
            attempt: Set(delivery.attempt),
            next_retry_at: Set(delivery.next_retry_at.map(Into::into)),
            created_at: Set(delivery.created_at.into()),
            updated_at: Set(delivery.updated_at.into()),
        };

        model.insert(self.db.as_ref()).await?;
        Ok(delivery.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookDelivery>, RepositoryError> {
        let model = webhook_delivery::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_event_id(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<WebhookDelivery>, RepositoryError> {
        let models = webhook_delivery::Entity::find()
            .filter(webhook_delivery::Column::EventId.eq(event_id))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_due_retries(&self, limit: u64) -> Result<Vec<WebhookDelivery>, RepositoryError> {
        let now = Utc::now();

        let models = webhook_delivery::Entity::find()
            .filter(webhook_delivery::Column::NextRetryAt.lte(now))
            .order_by_asc(webhook_delivery::Column::NextRetryAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, delivery: &WebhookDelivery) -> Result<WebhookDelivery, RepositoryError> {
        let mut active: webhook_delivery::ActiveModel = webhook_delivery::Entity::find_by_id(
            delivery.id,
        )
        .one(self.db.as_ref())
        .await?
        .ok_or(RepositoryError::NotFound)?
        .into();

        active.response_status = Set(delivery.response_status.map(|s| s as i16));
        active.response_body = Set(delivery.response_body.clone());
        active.attempt = Set(delivery.attempt);
        active.next_retry_at = Set(delivery.next_retry_at.map(Into::into));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }
}
