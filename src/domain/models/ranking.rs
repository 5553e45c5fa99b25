// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9-]{1,200}$").expect("valid regex"));

/// 餐厅标识是否合法：1到200个小写字母、数字或连字符
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

/// 排名快照
///
/// 一次成功解析的结果：某餐厅在某一时刻的列表位置和评分。创建后不可修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    /// 存储分配的ID，尚未持久化时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// 餐厅标识（平台URL slug）
    pub restaurant_slug: String,
    /// 列表中的位置，从1开始
    pub rank: u32,
    /// 评分
    pub rating: Option<f64>,
    /// 观测时间
    #[serde(rename = "timestamp")]
    pub observed_at: DateTime<Utc>,
}

impl RankingSnapshot {
    /// 创建新的排名快照，观测时间为当前时间
    pub fn new(restaurant_slug: impl Into<String>, rank: u32, rating: Option<f64>) -> Self {
        Self::observed(restaurant_slug, rank, rating, Utc::now())
    }

    /// 以指定观测时间创建排名快照
    pub fn observed(
        restaurant_slug: impl Into<String>,
        rank: u32,
        rating: Option<f64>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(rank >= 1, "rank is 1-based");
        Self {
            id: None,
            restaurant_slug: restaurant_slug.into(),
            rank,
            rating,
            observed_at,
        }
    }
}
