// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::ranking::RankingSnapshot;

const RULE_WIDTH: usize = 80;

/// 把排名历史渲染为文本表格
///
/// 每行依次为观测时间、餐厅标识、排名和评分，缺少评分时显示 `N/A`，末尾给出总条数。
/// 没有记录时只输出一行提示。
pub fn render_history(restaurant_slug: Option<&str>, rankings: &[RankingSnapshot]) -> String {
    if rankings.is_empty() {
        return match restaurant_slug {
            Some(slug) => format!("No rankings found for {}\n", slug),
            None => "No rankings found\n".to_string(),
        };
    }

    let mut lines = Vec::with_capacity(rankings.len() + 6);
    lines.push(String::new());
    lines.push("Rankings:".to_string());
    lines.push("=".repeat(RULE_WIDTH));
    lines.push(row("Timestamp", "Restaurant", "Rank", "Rating"));
    lines.push("-".repeat(RULE_WIDTH));

    for snapshot in rankings {
        let rating = snapshot
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "N/A".to_string());
        lines.push(row(
            &snapshot.observed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            &snapshot.restaurant_slug,
            &snapshot.rank.to_string(),
            &rating,
        ));
    }

    lines.push("=".repeat(RULE_WIDTH));
    lines.push(format!("Total entries: {}", rankings.len()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn row(timestamp: &str, slug: &str, rank: &str, rating: &str) -> String {
    format!("{:<25} {:<35} {:<6} {:<6}", timestamp, slug, rank, rating)
        .trim_end()
        .to_string()
}
