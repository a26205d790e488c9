// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::WebhookEndpoint;
use crate::domain::repositories::integration_repository::RepositoryError;
use crate::domain::repositories::webhook_endpoint_repository::WebhookEndpointRepository;
use std::sync::Arc;

pub struct CreateEndpointUseCase<R: WebhookEndpointRepository> {
    repo: Arc<R>,
}

impl<R: WebhookEndpointRepository> CreateEndpointUseCase<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 注册一个订阅端点
    ///
    /// 密钥由服务端生成并随创建结果一次性返回。
    pub async fn execute(
        &self,
        url: String,
        events: Vec<String>,
        description: Option<String>,
        created_by: Option<String>,
    ) -> Result<WebhookEndpoint, RepositoryError> {
        let endpoint = WebhookEndpoint::new(url, events, description, created_by);
        self.repo.create(&endpoint).await?;
        Ok(endpoint)
    }
}
