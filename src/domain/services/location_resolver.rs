// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::domain::models::location::Location;
use crate::domain::services::errors::RankError;
use crate::engines::traits::{RenderError, RenderSession};
use crate::utils::retry_policy::RetryPolicy;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

static POSTAL_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{5}\b").expect("valid regex"));

/// 地址解析器配置
#[derive(Debug, Clone)]
pub struct LocationResolverConfig {
    /// 平台基础URL
    pub base_url: String,
    /// 展开地址信息的按钮
    pub reveal_selector: String,
    /// 展开后的地址文本
    pub address_selector: String,
    /// 页面加载后的基础等待时间
    pub settle_wait: Duration,
    /// 等待按钮与地址出现的基础超时
    pub reveal_timeout: Duration,
    /// 重试策略
    pub retry: RetryPolicy,
}

impl Default for LocationResolverConfig {
    fn default() -> Self {
        Self::from(&ScraperSettings::default())
    }
}

impl From<&ScraperSettings> for LocationResolverConfig {
    fn from(settings: &ScraperSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            reveal_selector: "[data-qa='restaurant-header-action-info']".to_string(),
            address_selector: "[data-qa='restaurant-info-modal-info-address']".to_string(),
            settle_wait: Duration::from_millis(settings.location_settle_ms),
            reveal_timeout: Duration::from_millis(settings.reveal_timeout_ms),
            retry: RetryPolicy::linear(settings.location_attempts),
        }
    }
}

/// 单次尝试失败的原因
#[derive(Error, Debug)]
enum AttemptError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("address text is empty")]
    EmptyAddress,
    #[error("no line with a postal code in {0:?}")]
    NoPostalCode(String),
}

/// 地址解析器
///
/// 打开餐厅详情页，点击信息按钮展开地址，从地址文本中取出邮编和城市
pub struct LocationResolver {
    config: LocationResolverConfig,
}

impl LocationResolver {
    pub fn new(config: LocationResolverConfig) -> Self {
        Self { config }
    }

    /// 餐厅详情页URL
    pub fn detail_url(&self, restaurant_slug: &str) -> String {
        format!("{}/speisekarte/{}", self.config.base_url, restaurant_slug)
    }

    /// 解析餐厅所在的配送区域
    ///
    /// 每次尝试都会重新加载页面，并按尝试次数放大等待时间。
    /// 尝试次数用尽返回 `RankError::LocationNotFound`。
    pub async fn locate<S: RenderSession>(
        &self,
        session: &S,
        restaurant_slug: &str,
    ) -> Result<Location, RankError> {
        let url = self.detail_url(restaurant_slug);
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            attempt += 1;
            metrics::counter!("rankrs_location_attempts_total").increment(1);

            match self.attempt(session, &url, attempt).await {
                Ok(location) => {
                    info!(
                        slug = restaurant_slug,
                        attempt,
                        postal_code = %location.postal_code,
                        city = %location.city,
                        "Resolved restaurant location"
                    );
                    return Ok(location);
                }
                Err(AttemptError::Render(e)) if e.is_session_fatal() => {
                    warn!(slug = restaurant_slug, attempt, error = %e, "Render session failed, giving up");
                    return Err(RankError::LocationNotFound {
                        slug: restaurant_slug.to_string(),
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(slug = restaurant_slug, attempt, error = %e, "Location attempt failed");
                    if !retry.should_retry(attempt) {
                        return Err(RankError::LocationNotFound {
                            slug: restaurant_slug.to_string(),
                            attempts: attempt,
                        });
                    }
                }
            }
        }
    }

    async fn attempt<S: RenderSession>(
        &self,
        session: &S,
        url: &str,
        attempt: u32,
    ) -> Result<Location, AttemptError> {
        let retry = &self.config.retry;
        let settle = retry.scaled(self.config.settle_wait, attempt);
        let timeout = retry.scaled(self.config.reveal_timeout, attempt);
        debug!(url, attempt, ?settle, ?timeout, "Loading restaurant page");

        session.render(url).await?;
        tokio::time::sleep(settle).await;

        let button = session
            .wait_for(&self.config.reveal_selector, timeout)
            .await?;
        session.click(&button).await?;

        let address = session
            .wait_for(&self.config.address_selector, timeout)
            .await?;
        let text = session.text(&address).await?;

        if text.trim().is_empty() {
            return Err(AttemptError::EmptyAddress);
        }
        parse_address(&text).ok_or(AttemptError::NoPostalCode(text))
    }
}

/// 从地址文本中解析邮编和城市
///
/// 选择第一行包含5位数字的文本，数字为邮编，去掉邮编后的剩余部分为城市
pub fn parse_address(text: &str) -> Option<Location> {
    text.lines().find_map(|line| {
        let postal = POSTAL_CODE.find(line)?;
        let city = format!("{} {}", &line[..postal.start()], &line[postal.end()..]);
        let city = city
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| c == ',' || c.is_whitespace())
            .to_string();

        if city.is_empty() {
            return None;
        }
        Some(Location::new(postal.as_str(), city))
    })
}
