// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clap::Parser;
use rankrs::config::settings::Settings;
use rankrs::domain::models::ranking::{is_valid_slug, RankingSnapshot};
use rankrs::domain::repositories::ranking_repository::RankingRepository;
use rankrs::infrastructure::database::connection;
use rankrs::infrastructure::repositories::ranking_repo_impl::RankingRepositoryImpl;
use rankrs::presentation::history_table::render_history;
use rankrs::utils::telemetry;
use std::sync::Arc;

/// 每天按小时采样的条数
const ENTRIES_PER_DAY: u64 = 24;

#[derive(Debug, Parser)]
#[command(name = "view_ranking", about = "View recorded restaurant rankings")]
struct Cli {
    /// Restaurant slug to filter by; all tracked restaurants when omitted
    #[arg(long)]
    slug: Option<String>,

    /// Number of days to look back
    #[arg(long, default_value_t = 7)]
    days: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_cli_telemetry();
    let cli = Cli::parse();

    if let Some(slug) = cli.slug.as_deref() {
        if !is_valid_slug(slug) {
            anyhow::bail!("Invalid restaurant slug: {}", slug);
        }
    }

    let settings = Settings::new()?;
    let db = connection::connect_and_migrate(&settings.database).await?;
    let repository = RankingRepositoryImpl::new(Arc::new(db));

    let limit = cli.days.saturating_mul(ENTRIES_PER_DAY);
    let slugs = match &cli.slug {
        Some(slug) => vec![slug.clone()],
        None => settings.scheduler.restaurants.clone(),
    };
    let rankings = collect_recent(&repository, &slugs, limit).await?;

    print!("{}", render_history(cli.slug.as_deref(), &rankings));
    Ok(())
}

/// 合并多个餐厅的最近记录，按时间从新到旧，最多 `limit` 条
async fn collect_recent<R: RankingRepository>(
    repository: &R,
    slugs: &[String],
    limit: u64,
) -> anyhow::Result<Vec<RankingSnapshot>> {
    let mut rankings = Vec::new();
    for slug in slugs {
        rankings.extend(repository.recent(slug, limit).await?);
    }
    rankings.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
    rankings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    Ok(rankings)
}
