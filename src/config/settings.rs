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

use crate::domain::models::ranking::is_valid_slug;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 默认跟踪的餐厅
const DEFAULT_RESTAURANTS: [&str; 3] = [
    "loco-chicken-i-frechen",
    "loco-chicken-bielefeld",
    "happy-slice-pizza-i-wandsbek-markt",
];

/// 调度周期上限（7天）
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// 应用程序配置设置
///
/// 包含数据库、服务器、抓取、调度和指标等所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取配置
    pub scraper: ScraperSettings,
    /// 调度配置
    pub scheduler: SchedulerSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 数据库配置设置
#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 目标平台基础URL
    pub base_url: String,
    /// Chrome远程调试地址
    pub remote_debugging_url: Option<String>,
    /// 浏览器请求超时（秒）
    pub request_timeout_secs: u64,
    /// 自定义User-Agent
    pub user_agent: Option<String>,
    /// 列表页加载后的等待时间（毫秒）
    pub listing_settle_ms: u64,
    /// 每次滚动后的等待时间（毫秒）
    pub scroll_pause_ms: u64,
    /// 等待列表容器出现的超时（毫秒）
    pub container_timeout_ms: u64,
    /// 详情页加载后的基础等待时间（毫秒），按尝试次数放大
    pub location_settle_ms: u64,
    /// 等待地址按钮出现的基础超时（毫秒），按尝试次数放大
    pub reveal_timeout_ms: u64,
    /// 地址解析最大尝试次数
    pub location_attempts: u32,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.lieferando.de".to_string(),
            remote_debugging_url: None,
            request_timeout_secs: 30,
            user_agent: None,
            listing_settle_ms: 10_000,
            scroll_pause_ms: 3_000,
            container_timeout_ms: 15_000,
            location_settle_ms: 3_000,
            reveal_timeout_ms: 5_000,
            location_attempts: 3,
        }
    }
}

/// 调度配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 是否启动调度器
    pub enabled: bool,
    /// 调度周期（分钟）
    pub interval_minutes: u64,
    /// 两个餐厅之间的间隔（秒）
    pub pacing_secs: u64,
    /// 跟踪的餐厅标识
    pub restaurants: Vec<String>,
}

/// 指标配置设置
#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败或配置无效
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let defaults = ScraperSettings::default();
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Default DB settings
            .set_default("database.url", "sqlite://rankings.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default scraper settings
            .set_default("scraper.base_url", defaults.base_url.as_str())?
            .set_default("scraper.request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("scraper.listing_settle_ms", defaults.listing_settle_ms)?
            .set_default("scraper.scroll_pause_ms", defaults.scroll_pause_ms)?
            .set_default("scraper.container_timeout_ms", defaults.container_timeout_ms)?
            .set_default("scraper.location_settle_ms", defaults.location_settle_ms)?
            .set_default("scraper.reveal_timeout_ms", defaults.reveal_timeout_ms)?
            .set_default("scraper.location_attempts", defaults.location_attempts)?
            // Default scheduler settings
            .set_default("scheduler.enabled", true)?
            .set_default("scheduler.interval_minutes", 60)?
            .set_default("scheduler.pacing_secs", 5)?
            .set_default("scheduler.restaurants", DEFAULT_RESTAURANTS.to_vec())?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("RANKRS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("scheduler.restaurants")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置
    ///
    /// 跟踪列表为空、含非法标识或周期超出范围都属于致命的配置错误
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.interval_minutes == 0
            || self.scheduler.interval_minutes > MAX_INTERVAL_MINUTES
        {
            return Err(ConfigError::Message(format!(
                "scheduler.interval_minutes must be between 1 and {}",
                MAX_INTERVAL_MINUTES
            )));
        }
        if self.scheduler.restaurants.is_empty() {
            return Err(ConfigError::Message(
                "scheduler.restaurants must contain at least one slug".to_string(),
            ));
        }
        if let Some(slug) = self
            .scheduler
            .restaurants
            .iter()
            .find(|slug| !is_valid_slug(slug))
        {
            return Err(ConfigError::Message(format!(
                "scheduler.restaurants contains an invalid slug: {:?}",
                slug
            )));
        }
        if self.scraper.location_attempts == 0 {
            return Err(ConfigError::Message(
                "scraper.location_attempts must be greater than 0".to_string(),
            ));
        }
        url::Url::parse(&self.scraper.base_url).map_err(|e| {
            ConfigError::Message(format!("scraper.base_url is not a valid URL: {}", e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
