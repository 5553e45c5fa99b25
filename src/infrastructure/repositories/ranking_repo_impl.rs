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

use crate::domain::models::ranking::RankingSnapshot;
use crate::domain::repositories::ranking_repository::RankingRepository;
use crate::infrastructure::database::entities::ranking as ranking_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;

/// 排名历史仓库实现
pub struct RankingRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl RankingRepositoryImpl {
    /// 创建新的排名历史仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<ranking_entity::Model> for RankingSnapshot {
    type Error = RepositoryError;

    fn try_from(m: ranking_entity::Model) -> Result<Self, Self::Error> {
        let rank = u32::try_from(m.rank).map_err(|_| {
            RepositoryError::InternalError(format!("排名记录 {} 的名次无效: {}", m.id, m.rank))
        })?;

        Ok(RankingSnapshot {
            id: Some(m.id),
            restaurant_slug: m.restaurant_slug,
            rank,
            rating: m.rating,
            observed_at: m.timestamp.into(),
        })
    }
}

#[async_trait]
impl RankingRepository for RankingRepositoryImpl {
    async fn append(&self, snapshot: &RankingSnapshot) -> Result<RankingSnapshot, RepositoryError> {
        if snapshot.rank == 0 {
            return Err(RepositoryError::InvalidParameter(
                "名次从1开始".to_string(),
            ));
        }
        let rank = i32::try_from(snapshot.rank).map_err(|_| {
            RepositoryError::InvalidParameter(format!("名次超出范围: {}", snapshot.rank))
        })?;

        let model = ranking_entity::ActiveModel {
            id: NotSet,
            restaurant_slug: Set(snapshot.restaurant_slug.clone()),
            rank: Set(rank),
            rating: Set(snapshot.rating),
            timestamp: Set(snapshot.observed_at.into()),
        };

        let stored = model.insert(self.db.as_ref()).await?;
        RankingSnapshot::try_from(stored)
    }

    async fn recent(
        &self,
        restaurant_slug: &str,
        limit: u64,
    ) -> Result<Vec<RankingSnapshot>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        ranking_entity::Entity::find()
            .filter(ranking_entity::Column::RestaurantSlug.eq(restaurant_slug))
            .order_by_desc(ranking_entity::Column::Timestamp)
            .order_by_desc(ranking_entity::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(RankingSnapshot::try_from)
            .collect()
    }
}
