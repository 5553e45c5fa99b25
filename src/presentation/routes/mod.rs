// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::ranking_handler;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

/// 创建应用路由
///
/// 处理器依赖的排名来源和历史仓库通过 `Extension` 层注入。
/// 接口对任意来源开放跨域访问。
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let ranking_routes = Router::new()
        .route("/v1/rank/{slug}", get(ranking_handler::get_current_rank))
        .route(
            "/v1/rankings/{slug}",
            get(ranking_handler::get_ranking_history),
        );

    Router::new()
        .merge(public_routes)
        .merge(ranking_routes)
        .layer(CorsLayer::permissive())
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
