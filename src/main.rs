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

use axum::Extension;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use syncrs::config::settings::Settings;
use syncrs::domain::repositories::integration_repository::IntegrationRepository;
use syncrs::domain::services::billing_service::BillingService;
use syncrs::domain::services::integration_service::IntegrationService;
use syncrs::domain::services::webhook_dispatcher::WebhookDispatcher;
use syncrs::infrastructure::database::connection;
use syncrs::infrastructure::repositories::billing_repo_impl::BillingRepoImpl;
use syncrs::infrastructure::repositories::integration_repo_impl::IntegrationRepoImpl;
use syncrs::infrastructure::repositories::webhook_delivery_repo_impl::WebhookDeliveryRepoImpl;
use syncrs::infrastructure::repositories::webhook_endpoint_repo_impl::WebhookEndpointRepoImpl;
use syncrs::infrastructure::services::webhook_dispatcher_impl::HttpWebhookDispatcher;
use syncrs::presentation::routes;
use syncrs::providers::traits::SyncContext;
use syncrs::providers::ProviderRegistry;
use syncrs::utils::telemetry;
use syncrs::workers::retry_worker::RetryWorker;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting syncrs...");

    // Initialize Prometheus Metrics
    syncrs::infrastructure::metrics::init_metrics();

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // Run database migrations
    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. Initialize repositories
    let integration_repo = Arc::new(IntegrationRepoImpl::new(db.clone()));
    let endpoint_repo = Arc::new(WebhookEndpointRepoImpl::new(db.clone()));
    let delivery_repo = Arc::new(WebhookDeliveryRepoImpl::new(db.clone()));
    let billing_repo = Arc::new(BillingRepoImpl::new(db.clone()));

    // 5. Initialize services
    let dispatcher: Arc<dyn WebhookDispatcher> = Arc::new(HttpWebhookDispatcher::new(
        endpoint_repo.clone(),
        delivery_repo.clone(),
        &settings.webhook,
    ));
    let integration_service = Arc::new(IntegrationService::new(integration_repo.clone()));
    let billing_service = Arc::new(BillingService::new(billing_repo.clone()));

    // 6. Initialize provider sync adapters
    let sync_ctx = SyncContext::new(
        integration_repo.clone() as Arc<dyn IntegrationRepository>,
        dispatcher.clone(),
    );
    let registry = Arc::new(ProviderRegistry::new(sync_ctx));

    // 7. Start the delivery retry worker
    let retry_worker = RetryWorker::new(
        delivery_repo.clone(),
        endpoint_repo.clone(),
        &settings.webhook,
    );
    tokio::spawn(async move {
        retry_worker.run().await;
    });

    // 8. Start HTTP server
    let app = routes::routes()
        .layer(Extension(registry))
        .layer(Extension(dispatcher))
        .layer(Extension(integration_service))
        .layer(Extension(billing_service))
        .layer(Extension(endpoint_repo))
        .layer(Extension(delivery_repo))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
