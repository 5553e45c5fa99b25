// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

/// 配送区域位置
///
/// 由餐厅详情页的地址解析得到，仅作为定位与列表扫描之间的中间值，不做持久化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// 5位邮政编码
    pub postal_code: String,
    /// 城市名
    pub city: String,
}

impl Location {
    pub fn new(postal_code: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            postal_code: postal_code.into(),
            city: city.into(),
        }
    }

    /// 生成列表页路径片段，例如 `Frechen` + `50226` -> `frechen-50226`
    ///
    /// 德语变音字母按平台习惯转写（ä -> ae），其余非ASCII字符用deunicode转写
    pub fn listing_slug(&self) -> String {
        let mut city = String::with_capacity(self.city.len());
        for c in self.city.trim().to_lowercase().chars() {
            match c {
                'ä' => city.push_str("ae"),
                'ö' => city.push_str("oe"),
                'ü' => city.push_str("ue"),
                'ß' => city.push_str("ss"),
                _ => city.push(c),
            }
        }

        let mut slug = String::with_capacity(city.len() + self.postal_code.len() + 1);
        let mut pending_dash = false;
        for c in deunicode(&city).chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }

        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&self.postal_code);
        slug
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.postal_code, self.city)
    }
}
