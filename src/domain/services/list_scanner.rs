// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::domain::models::location::Location;
use crate::domain::models::ranking::is_valid_slug;
use crate::domain::services::errors::RankError;
use crate::engines::traits::{RenderError, RenderSession};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, warn};

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:[.,]\d+)?)").expect("valid regex"));

/// 列表扫描器配置
#[derive(Debug, Clone)]
pub struct ListScannerConfig {
    /// 平台基础URL
    pub base_url: String,
    /// 列表容器
    pub container_selector: String,
    /// 列表条目
    pub entry_selector: String,
    /// 条目中的链接
    pub link_selector: String,
    /// 条目中的评分
    pub rating_selector: String,
    /// 列表页加载后的等待时间
    pub settle_wait: Duration,
    /// 每次滚动后的等待时间
    pub scroll_pause: Duration,
    /// 等待列表容器出现的超时
    pub container_timeout: Duration,
    /// 条目数连续不变多少轮后判定列表到底
    pub count_plateau: u32,
    /// 页面高度不变且条目数已连续不变多少轮后判定列表到底
    pub extent_plateau: u32,
}

impl Default for ListScannerConfig {
    fn default() -> Self {
        Self::from(&ScraperSettings::default())
    }
}

impl From<&ScraperSettings> for ListScannerConfig {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            container_selector: "[data-qa='list-all-open-content']".to_string(),
            entry_selector: "[data-qa='restaurant-card']".to_string(),
            link_selector: "a".to_string(),
            rating_selector: "[data-qa='restaurant-ratings']".to_string(),
            settle_wait: Duration::from_millis(settings.listing_settle_ms),
            scroll_pause: Duration::from_millis(settings.scroll_pause_ms),
            container_timeout: Duration::from_millis(settings.container_timeout_ms),
            count_plateau: 3,
            extent_plateau: 2,
        }
    }
}

/// 扫描命中结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHit {
    /// 从1开始的位置
    pub rank: u32,
    /// 评分，解析失败时为空
    pub rating: Option<f64>,
}

/// 列表扫描器
///
/// 打开区域列表页，逐步滚动加载更多条目，直到找到目标或判定列表已经到底。
///
/// 终止条件有两个：条目数连续 `count_plateau` 轮不变；或者滚动前后页面高度
/// 不变且条目数已经连续 `extent_plateau` 轮不变。两个信号都单调不减且受列表
/// 真实长度约束，因此扫描一定会结束。
pub struct ListScanner {
    config: ListScannerConfig,
}

impl ListScanner {
    pub fn new(config: ListScannerConfig) -> Self {
        Self { config }
    }

    /// 区域列表页URL
    pub fn listing_url(&self, location: &Location) -> String {
        format!(
            "{}/lieferservice/essen/{}",
            self.config.base_url,
            location.listing_slug()
        )
    }

    /// 在区域列表中查找目标餐厅
    pub async fn scan<S: RenderSession>(
        &self,
        session: &S,
        location: &Location,
        restaurant_slug: &str,
    ) -> Result<ScanHit, RankError> {
        if !is_valid_slug(restaurant_slug) {
            warn!(slug = restaurant_slug, "Refusing to scan for an invalid slug");
            return Err(RankError::ListExhausted {
                slug: restaurant_slug.to_string(),
                scanned: 0,
            });
        }

        let url = self.listing_url(location);
        info!(slug = restaurant_slug, url = %url, "Scanning listing");

        session.render(&url).await?;
        tokio::time::sleep(self.config.settle_wait).await;
        session
            .wait_for(&self.config.container_selector, self.config.container_timeout)
            .await?;

        let entries_selector = format!(
            "{} {}",
            self.config.container_selector, self.config.entry_selector
        );

        let mut rank: u32 = 0;
        let mut previous_count: Option<usize> = None;
        let mut unchanged: u32 = 0;

        loop {
            let entries = session.find_all(&entries_selector).await?;
            let count = entries.len();

            if previous_count == Some(count) {
                unchanged += 1;
            } else {
                unchanged = 0;
            }
            previous_count = Some(count);

            if unchanged >= self.config.count_plateau {
                return Err(self.exhausted(restaurant_slug, rank, "entry count plateau"));
            }

            for entry in entries.iter().skip(rank as usize) {
                rank += 1;
                match self.entry_matches(session, entry, restaurant_slug).await {
                    Ok(true) => {
                        let rating = self.entry_rating(session, entry).await;
                        info!(slug = restaurant_slug, rank, ?rating, "Found target restaurant");
                        metrics::histogram!("rankrs_scan_entries").record(rank as f64);
                        return Ok(ScanHit { rank, rating });
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!(slug = restaurant_slug, rank, error = %e, "Skipping unreadable entry");
                    }
                }
            }

            let before = session.scroll_extent().await?;
            session.scroll_to_bottom().await?;
            tokio::time::sleep(self.config.scroll_pause).await;
            let after = session.scroll_extent().await?;

            if before == after && unchanged >= self.config.extent_plateau {
                return Err(self.exhausted(restaurant_slug, rank, "content extent plateau"));
            }

            debug!(
                slug = restaurant_slug,
                scanned = rank,
                extent = after,
                unchanged,
                "Scrolled for more entries"
            );
        }
    }

    fn exhausted(&self, restaurant_slug: &str, scanned: u32, reason: &str) -> RankError {
        warn!(
            slug = restaurant_slug,
            scanned, reason, "Reached end of listing without finding target restaurant"
        );
        metrics::histogram!("rankrs_scan_entries").record(scanned as f64);
        RankError::ListExhausted {
            slug: restaurant_slug.to_string(),
            scanned,
        }
    }

    async fn entry_matches<S: RenderSession>(
        &self,
        session: &S,
        entry: &S::Element,
        restaurant_slug: &str,
    ) -> Result<bool, RenderError> {
        let links = session.find_within(entry, &self.config.link_selector).await?;
        let link = links
            .first()
            .ok_or_else(|| RenderError::ElementNotFound(self.config.link_selector.clone()))?;
        let href = session.attribute(link, "href").await?.unwrap_or_default();
        Ok(href.contains(restaurant_slug))
    }

    async fn entry_rating<S: RenderSession>(&self, session: &S, entry: &S::Element) -> Option<f64> {
        let ratings = match session.find_within(entry, &self.config.rating_selector).await {
            Ok(ratings) => ratings,
            Err(e) => {
                warn!(error = %e, "Failed to read rating");
                return None;
            }
        };
        let Some(element) = ratings.first() else {
            warn!("Rating not found for restaurant");
            return None;
        };

        match session.text(element).await {
            Ok(text) => {
                let rating = parse_rating(&text);
                if rating.is_none() {
                    warn!(text = %text, "Unparseable rating text");
                }
                rating
            }
            Err(e) => {
                warn!(error = %e, "Failed to read rating");
                None
            }
        }
    }
}

/// 解析评分文本，例如 `4,5 (66)` -> 4.5
///
/// 取开头的数字，逗号视为小数点；无法解析时返回 `None`
pub fn parse_rating(text: &str) -> Option<f64> {
    let captures = LEADING_NUMBER.captures(text)?;
    captures
        .get(1)?
        .as_str()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
