// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::RankingSnapshot;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 排名历史仓库特质
///
/// 只追加的时间序列：记录一旦写入不会被修改或删除
#[async_trait]
pub trait RankingRepository: Send + Sync {
    /// 追加排名快照，返回带存储ID的快照
    async fn append(&self, snapshot: &RankingSnapshot) -> Result<RankingSnapshot, RepositoryError>;

    /// 查询某餐厅最近的排名，按时间从新到旧
    async fn recent(
        &self,
        restaurant_slug: &str,
        limit: u64,
    ) -> Result<Vec<RankingSnapshot>, RepositoryError>;
}
