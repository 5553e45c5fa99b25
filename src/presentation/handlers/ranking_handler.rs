// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::{is_valid_slug, RankingSnapshot};
use crate::domain::repositories::ranking_repository::RankingRepository;
use crate::domain::services::rank_resolver::RankingSource;
use crate::presentation::errors::{ApiError, AppError};
use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

/// 历史查询默认条数
pub const DEFAULT_HISTORY_LIMIT: u64 = 100;
/// 历史查询最大条数
pub const MAX_HISTORY_LIMIT: u64 = 1000;

/// 历史查询参数
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// 返回条数，默认100，最大1000
    pub limit: Option<u64>,
}

/// 解析餐厅当前排名
///
/// 通过共享的排名解析器实时解析，成功时同时写入历史
///
/// # 参数
///
/// * `source` - 排名来源
/// * `slug` - 餐厅标识
///
/// # 返回值
///
/// * `Ok(Json<RankingSnapshot>)` - 当前排名
/// * `Err(AppError)` - 标识无效（400）或当前没有排名（404）
pub async fn get_current_rank(
    Extension(source): Extension<Arc<dyn RankingSource>>,
    Path(slug): Path<String>,
) -> Result<Json<RankingSnapshot>, AppError> {
    validate_slug(&slug)?;

    match source.resolve_ranking(&slug).await? {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Err(ApiError::RankingNotFound.into()),
    }
}

/// 查询餐厅的排名历史，按时间从新到旧
///
/// # 参数
///
/// * `repository` - 排名历史仓库
/// * `slug` - 餐厅标识
/// * `query` - 查询参数
pub async fn get_ranking_history(
    Extension(repository): Extension<Arc<dyn RankingRepository>>,
    Path(slug): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<RankingSnapshot>>, AppError> {
    validate_slug(&slug)?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let history = repository.recent(&slug, limit).await?;

    Ok(Json(history))
}

fn validate_slug(slug: &str) -> Result<(), ApiError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ApiError::InvalidSlug(slug.to_string()))
    }
}
