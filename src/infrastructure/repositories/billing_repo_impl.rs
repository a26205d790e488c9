// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::billing::{Customer, Payment, Subscription};
use crate::domain::repositories::billing_repository::BillingRepository;
use crate::domain::repositories::integration_repository::RepositoryError;
use crate::infrastructure::database::entities::{customer, payment, subscription};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;

/// 账单仓库实现
#[derive(Clone)]
pub struct BillingRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl BillingRepoImpl {
    /// 创建新的账单仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<customer::Model> for Customer {
    fn from(model: customer::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            stripe_customer_id: model.stripe_customer_id,
            created_at: model.created_at.into(),
        }
    }
}

impl From<payment::Model> for Payment {
    fn from(model: payment::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            stripe_payment_intent_id: model.stripe_payment_intent_id,
            amount: model.amount,
            currency: model.currency,
            status: model.status,
            created_at: model.created_at.into(),
        }
    }
}

impl From<subscription::Model> for Subscription {
    fn from(model: subscription::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            stripe_subscription_id: model.stripe_subscription_id,
            status: model.status,
            current_period_end: model.current_period_end.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[async_trait]
impl BillingRepository for BillingRepoImpl {
    async fn find_customer_by_stripe_id(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let model = customer::Entity::find()
            .filter(customer::Column::StripeCustomerId.eq(stripe_customer_id))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn upsert_payment(&self, item: &Payment) -> Result<Payment, RepositoryError> {
        let existing = payment::Entity::find()
            .filter(payment::Column::StripePaymentIntentId.eq(item.stripe_payment_intent_id.clone()))
            .one(self.db.as_ref())
            .await?;

        match existing {
            Some(model) => {
                let mut active: payment::ActiveModel = model.into();
                active.customer_id = Set(item.customer_id);
                active.amount = Set(item.amount);
                active.currency = Set(item.currency.clone());
                active.status = Set(item.status.clone());
                let updated = active.update(self.db.as_ref()).await?;
                Ok(updated.into())
            }
            None => {
                let model = payment::ActiveModel {
                    id: Set(item.id),
                    customer_id: Set(item.customer_id),
                    stripe_payment_intent_id: Set(item.stripe_payment_intent_id.clone()),
                    amount: Set(item.amount),
                    currency: Set(item.currency.clone()),
                    status: Set(item.status.clone()),
                    created_at: Set(item.created_at.into()),
                };
                model.insert(self.db.as_ref()).await?;
                Ok(item.clone())
            }
        }
    }

    async fn upsert_subscription(
        &self,
        item: &Subscription,
    ) -> Result<Subscription, RepositoryError> {
        let existing = subscription::Entity::find()
            .filter(
                subscription::Column::StripeSubscriptionId.eq(item.stripe_subscription_id.clone()),
            )
            .one(self.db.as_ref())
            .await?;

        match existing {
            Some(model) => {
                let mut active: subscription::ActiveModel = model.into();
                active.customer_id = Set(item.customer_id);
                active.status = Set(item.status.clone());
                active.current_period_end = Set(item.current_period_end.map(Into::into));
                active.updated_at = Set(Utc::now().into());
                let updated = active.update(self.db.as_ref()).await?;
                Ok(updated.into())
            }
            None => {
                let model = subscription::ActiveModel {
                    id: Set(item.id),
                    customer_id: Set(item.customer_id),
                    stripe_subscription_id: Set(item.stripe_subscription_id.clone()),
                    status: Set(item.status.clone()),
                    current_period_end: Set(item.current_period_end.map(Into::into)),
                    created_at: Set(item.created_at.into()),
                    updated_at: Set(item.updated_at.into()),
                };
                model.insert(self.db.as_ref()).await?;
                Ok(item.clone())
            }
        }
    }
}
