// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::fake_site::{fast_scraper_settings, FakeRenderer, FakeSite};
use super::helpers::setup_db;
use rankrs::domain::repositories::ranking_repository::RankingRepository;
use rankrs::domain::services::list_scanner::{ListScanner, ListScannerConfig};
use rankrs::domain::services::location_resolver::{LocationResolver, LocationResolverConfig};
use rankrs::domain::services::rank_resolver::RankResolver;
use rankrs::infrastructure::repositories::ranking_repo_impl::RankingRepositoryImpl;
use rankrs::workers::ranking_scheduler::{CycleReport, RankingScheduler, SchedulerConfig};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const FRECHEN: &str = "loco-chicken-i-frechen";
const BIELEFELD: &str = "loco-chicken-bielefeld";
const WANDSBEK: &str = "happy-slice-pizza-i-wandsbek-markt";

fn site() -> FakeSite {
    FakeSite::default()
        .restaurant(FRECHEN, "Loco Chicken\nHauptstraße 1\n50226 Frechen")
        .restaurant(BIELEFELD, "Loco Chicken\nNiederwall 10\n33602 Bielefeld")
        .restaurant(WANDSBEK, "Wandsbeker Marktstraße 5\n22041 Hamburg")
        .listing("frechen-50226", &["pizza-roma", FRECHEN])
        .listing(
            "bielefeld-33602",
            &["sushi-bar", "doener-king", BIELEFELD, "burger-house"],
        )
        .crashing_on(WANDSBEK)
}

/// 一个餐厅解析崩溃时，同一周期内的其他餐厅仍被解析并记录
#[tokio::test]
async fn cycle_records_other_targets_when_one_crashes() {
    let renderer = Arc::new(FakeRenderer::new(site()));
    let history = Arc::new(RankingRepositoryImpl::new(setup_db().await));
    let settings = fast_scraper_settings();

    let resolver = RankResolver::new(
        renderer.clone(),
        LocationResolver::new(LocationResolverConfig::from(&settings)),
        ListScanner::new(ListScannerConfig::from(&settings)),
    )
    .with_history(history.clone());

    let scheduler = RankingScheduler::new(
        Arc::new(resolver),
        SchedulerConfig {
            interval: Duration::from_secs(3600),
            pacing: Duration::from_millis(1),
            restaurants: vec![
                FRECHEN.to_string(),
                WANDSBEK.to_string(),
                BIELEFELD.to_string(),
            ],
        },
    );

    let report = scheduler.run_cycle().await;

    assert_eq!(
        report,
        CycleReport {
            found: 2,
            absent: 1,
            failed: 0
        }
    );

    let frechen = history.recent(FRECHEN, 5).await.unwrap();
    assert_eq!(frechen.len(), 1);
    assert_eq!(frechen[0].rank, 2);
    assert_eq!(frechen[0].rating, Some(4.5));

    let bielefeld = history.recent(BIELEFELD, 5).await.unwrap();
    assert_eq!(bielefeld.len(), 1);
    assert_eq!(bielefeld[0].rank, 3);

    assert!(history.recent(WANDSBEK, 5).await.unwrap().is_empty());

    // 每次解析使用独立会话；崩溃的会话被丢弃而不是关闭
    assert_eq!(renderer.site.sessions_opened.load(Ordering::SeqCst), 3);
    assert_eq!(renderer.site.sessions_closed.load(Ordering::SeqCst), 2);
}

/// 不在列表中的餐厅不会产生记录
#[tokio::test]
async fn unlisted_restaurant_is_not_recorded() {
    let site = FakeSite::default()
        .restaurant("closed-tonight", "50226 Frechen")
        .listing("frechen-50226", &["pizza-roma", FRECHEN]);
    let history = Arc::new(RankingRepositoryImpl::new(setup_db().await));
    let settings = fast_scraper_settings();

    let resolver = RankResolver::new(
        Arc::new(FakeRenderer::new(site)),
        LocationResolver::new(LocationResolverConfig::from(&settings)),
        ListScanner::new(ListScannerConfig::from(&settings)),
    )
    .with_history(history.clone());

    assert!(resolver.resolve("closed-tonight").await.is_none());
    assert!(history.recent("closed-tonight", 5).await.unwrap().is_empty());
}

/// 停止后调度循环在当前周期结束时退出
#[tokio::test]
async fn scheduler_stops_after_cycle() {
    let renderer = Arc::new(FakeRenderer::new(site()));
    let history = Arc::new(RankingRepositoryImpl::new(setup_db().await));
    let settings = fast_scraper_settings();

    let resolver = RankResolver::new(
        renderer,
        LocationResolver::new(LocationResolverConfig::from(&settings)),
        ListScanner::new(ListScannerConfig::from(&settings)),
    )
    .with_history(history.clone());

    let scheduler = Arc::new(RankingScheduler::new(
        Arc::new(resolver),
        SchedulerConfig {
            interval: Duration::from_secs(3600),
            pacing: Duration::ZERO,
            restaurants: vec![FRECHEN.to_string()],
        },
    ));

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.start().await }
    });

    // 等第一个周期写入记录
    let mut recorded = false;
    for _ in 0..200 {
        if !history.recent(FRECHEN, 1).await.unwrap().is_empty() {
            recorded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(recorded);

    scheduler.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap()
        .unwrap();
    assert!(!scheduler.is_running());
}
