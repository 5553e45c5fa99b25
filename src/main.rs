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
use rankrs::config::settings::Settings;
use rankrs::domain::repositories::ranking_repository::RankingRepository;
use rankrs::domain::services::list_scanner::{ListScanner, ListScannerConfig};
use rankrs::domain::services::location_resolver::{LocationResolver, LocationResolverConfig};
use rankrs::domain::services::rank_resolver::{RankResolver, RankingSource};
use rankrs::engines::chromium_renderer::{ChromiumConfig, ChromiumRenderer};
use rankrs::engines::traits::PageRenderer;
use rankrs::infrastructure::database::connection;
use rankrs::infrastructure::repositories::ranking_repo_impl::RankingRepositoryImpl;
use rankrs::presentation::routes;
use rankrs::workers::ranking_scheduler::{RankingScheduler, SchedulerConfig};
use rankrs::workers::Worker;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use rankrs::utils::telemetry;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting rankrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    rankrs::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Connect to database and run migrations
    let db = connection::connect_and_migrate(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    // 4. Build the ranking pipeline
    let renderer = Arc::new(ChromiumRenderer::new(ChromiumConfig::from(
        &settings.scraper,
    )));
    info!("Render engine: {}", renderer.name());

    let history = Arc::new(RankingRepositoryImpl::new(db.clone()));
    let resolver = Arc::new(
        RankResolver::new(
            renderer,
            LocationResolver::new(LocationResolverConfig::from(&settings.scraper)),
            ListScanner::new(ListScannerConfig::from(&settings.scraper)),
        )
        .with_history(history.clone()),
    );
    let source: Arc<dyn RankingSource> = resolver;
    let repository: Arc<dyn RankingRepository> = history;

    // 5. Start the scheduler
    let scheduler = Arc::new(RankingScheduler::new(
        source.clone(),
        SchedulerConfig::from(&settings.scheduler),
    ));
    let scheduler_handle = if settings.scheduler.enabled {
        let scheduler = scheduler.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = scheduler.run().await {
                error!("Worker {} exited: {}", scheduler.name(), e);
            }
        }))
    } else {
        info!("Scheduler disabled");
        None
    };

    // 6. Serve the read API
    let app = routes::routes()
        .layer(Extension(source))
        .layer(Extension(repository))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(scheduler.clone()))
        .await?;

    if let Some(handle) = scheduler_handle {
        info!("Waiting for the in-flight scheduler cycle to finish...");
        if let Err(e) = handle.await {
            error!("Scheduler task failed: {}", e);
        }
    }

    info!("rankrs shut down");
    Ok(())
}

/// 等待关闭信号
///
/// 收到信号后请求调度器停止；正在进行的解析会先完成
async fn shutdown_signal(scheduler: Arc<RankingScheduler>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
    scheduler.stop();
}
