// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::repositories::billing_repo_impl::BillingRepoImpl;
use crate::infrastructure::repositories::integration_repo_impl::IntegrationRepoImpl;
use crate::infrastructure::repositories::webhook_endpoint_repo_impl::WebhookEndpointRepoImpl;
use crate::presentation::handlers::{
    inbound_handler, integration_handler, stripe_handler, sync_handler, webhook_admin_handler,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/v1/sync/{provider}", post(sync_handler::trigger_sync))
        .route("/v1/sync/{provider}/status", get(sync_handler::sync_status))
        .route(
            "/v1/hooks/stripe",
            post(stripe_handler::stripe_webhook::<BillingRepoImpl>),
        )
        .route("/v1/hooks/{provider}", post(inbound_handler::receive_webhook))
        .route(
            "/v1/webhooks",
            post(webhook_admin_handler::create_endpoint::<WebhookEndpointRepoImpl>)
                .get(webhook_admin_handler::list_endpoints::<WebhookEndpointRepoImpl>),
        )
        .route("/v1/webhooks/test", post(webhook_admin_handler::test_dispatch))
        .route(
            "/v1/webhooks/{id}",
            delete(webhook_admin_handler::delete_endpoint::<WebhookEndpointRepoImpl>),
        )
        .route(
            "/v1/integrations",
            post(integration_handler::create_integration::<IntegrationRepoImpl>),
        )
        .route(
            "/v1/integrations/{provider}",
            get(integration_handler::get_integration::<IntegrationRepoImpl>)
                .patch(integration_handler::update_integration::<IntegrationRepoImpl>),
        )
        .route(
            "/v1/integrations/{provider}/secrets/{key}",
            put(integration_handler::set_secret::<IntegrationRepoImpl>),
        )
        .route(
            "/v1/integrations/{provider}/logs",
            get(integration_handler::get_logs::<IntegrationRepoImpl>),
        );

    Router::new().merge(public_routes).merge(api_routes)
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
