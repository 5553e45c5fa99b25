// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::RenderError;
use crate::utils::errors::RepositoryError;
use thiserror::Error;

/// 排名解析错误
///
/// 所有变体在 `RankResolver::resolve` 中都会被折叠为“未找到”，不会继续向上传播
#[derive(Error, Debug)]
pub enum RankError {
    /// 重试次数用尽仍未解析出地址
    #[error("Location not found for {slug} after {attempts} attempts")]
    LocationNotFound { slug: String, attempts: u32 },

    /// 列表已到底但没有找到目标
    #[error("Listing exhausted after {scanned} entries without finding {slug}")]
    ListExhausted { slug: String, scanned: u32 },

    /// 渲染失败
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// 快照持久化失败
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl RankError {
    /// 是否属于正常的“未找到”结果，而不是故障
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            RankError::LocationNotFound { .. } | RankError::ListExhausted { .. }
        )
    }
}
