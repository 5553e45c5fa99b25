// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::RankingSnapshot;
use crate::domain::repositories::ranking_repository::RankingRepository;
use crate::domain::services::errors::RankError;
use crate::domain::services::list_scanner::{ListScanner, ScanHit};
use crate::domain::services::location_resolver::LocationResolver;
use crate::engines::traits::{PageRenderer, RenderSession};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// 排名来源
///
/// 调度器和查询接口只依赖这个抽象。`Ok(None)` 表示本次没有得到排名，
/// `Err` 表示解析过程中出现了未被处理的故障。
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// 解析并记录某餐厅当前的排名
    async fn resolve_ranking(&self, restaurant_slug: &str)
        -> anyhow::Result<Option<RankingSnapshot>>;
}

/// 排名解析器
///
/// 串联地址解析和列表扫描。每次解析使用一个独立的渲染会话，结束时关闭；
/// 同一实例上的解析严格串行。配置了历史仓库时，解析成功后立即写入。
pub struct RankResolver<R, H>
where
    R: PageRenderer,
    H: RankingRepository,
{
    renderer: Arc<R>,
    locator: LocationResolver,
    scanner: ListScanner,
    history: Option<Arc<H>>,
    lock: Mutex<()>,
}

impl<R, H> RankResolver<R, H>
where
    R: PageRenderer,
    H: RankingRepository,
{
    pub fn new(renderer: Arc<R>, locator: LocationResolver, scanner: ListScanner) -> Self {
        Self {
            renderer,
            locator,
            scanner,
            history: None,
            lock: Mutex::new(()),
        }
    }

    /// 解析成功后写入历史仓库
    pub fn with_history(mut self, history: Arc<H>) -> Self {
        self.history = Some(history);
        self
    }

    /// 解析排名，保留失败原因
    ///
    /// 只有完整的快照才会被写入历史
    pub async fn try_resolve(&self, restaurant_slug: &str) -> Result<RankingSnapshot, RankError> {
        let _guard = self.lock.lock().await;

        let session = self.renderer.open().await?;
        let outcome = self.determine(&session, restaurant_slug).await;
        if let Err(e) = session.close().await {
            warn!(slug = restaurant_slug, error = %e, "Failed to close render session");
        }
        let hit = outcome?;

        let snapshot = RankingSnapshot::new(restaurant_slug, hit.rank, hit.rating);
        match &self.history {
            Some(history) => Ok(history.append(&snapshot).await?),
            None => Ok(snapshot),
        }
    }

    async fn determine(
        &self,
        session: &R::Session,
        restaurant_slug: &str,
    ) -> Result<ScanHit, RankError> {
        let location = self.locator.locate(session, restaurant_slug).await?;
        self.scanner.scan(session, &location, restaurant_slug).await
    }

    /// 解析排名
    ///
    /// 任何失败（包括协作方的panic）都折叠为 `None`，不会向上传播
    pub async fn resolve(&self, restaurant_slug: &str) -> Option<RankingSnapshot> {
        let outcome = AssertUnwindSafe(self.try_resolve(restaurant_slug))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(snapshot)) => {
                info!(
                    slug = restaurant_slug,
                    rank = snapshot.rank,
                    rating = ?snapshot.rating,
                    "Resolved ranking"
                );
                metrics::counter!("rankrs_resolutions_total", "outcome" => "found").increment(1);
                Some(snapshot)
            }
            Ok(Err(e)) if e.is_absence() => {
                warn!(slug = restaurant_slug, reason = %e, "Ranking not found");
                metrics::counter!("rankrs_resolutions_total", "outcome" => "not_found")
                    .increment(1);
                None
            }
            Ok(Err(e)) => {
                error!(slug = restaurant_slug, error = %e, "Ranking resolution failed");
                metrics::counter!("rankrs_resolutions_total", "outcome" => "error").increment(1);
                None
            }
            Err(_) => {
                error!(slug = restaurant_slug, "Ranking resolution panicked");
                metrics::counter!("rankrs_resolutions_total", "outcome" => "error").increment(1);
                None
            }
        }
    }
}

#[async_trait]
impl<R, H> RankingSource for RankResolver<R, H>
where
    R: PageRenderer,
    H: RankingRepository,
{
    async fn resolve_ranking(
        &self,
        restaurant_slug: &str,
    ) -> anyhow::Result<Option<RankingSnapshot>> {
        Ok(self.resolve(restaurant_slug).await)
    }
}
