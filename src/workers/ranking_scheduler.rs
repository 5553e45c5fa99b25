// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SchedulerSettings;
use crate::domain::models::ranking::is_valid_slug;
use crate::domain::services::rank_resolver::RankingSource;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// 调度器配置
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// 相邻两个周期开始时间的间隔
    pub interval: Duration,
    /// 两个餐厅之间的等待
    pub pacing: Duration,
    /// 跟踪列表
    pub restaurants: Vec<String>,
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            interval: Duration::from_secs(settings.interval_minutes.saturating_mul(60)),
            pacing: Duration::from_secs(settings.pacing_secs),
            restaurants: settings.restaurants.clone(),
        }
    }
}

/// 单个周期的结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// 解析出排名
    pub found: usize,
    /// 本周期没有排名
    pub absent: usize,
    /// 解析过程出现故障
    pub failed: usize,
}

/// 排名调度器
///
/// 状态机为 `Stopped → Running → Stopped`。运行时按固定周期依次解析每个跟踪的餐厅，
/// 单个餐厅的失败不会影响同一周期内的其他餐厅。
///
/// 停止标志只在周期之间检查：`stop` 返回后，正在进行的解析仍会完成。
/// 循环真正退出之前 `start` 一直返回 `AlreadyRunning`，同一时刻最多只有一个循环。
pub struct RankingScheduler {
    source: Arc<dyn RankingSource>,
    interval: Duration,
    pacing: Duration,
    tracked: Vec<String>,
    /// 未收到停止请求
    running: AtomicBool,
    /// 调度循环尚未退出
    active: AtomicBool,
    wake: Notify,
}

/// 循环退出（包括future被丢弃）时清除活动标志
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RankingScheduler {
    /// 创建调度器
    ///
    /// 跟踪列表去重，非法的餐厅标识会被丢弃
    pub fn new(source: Arc<dyn RankingSource>, config: SchedulerConfig) -> Self {
        let mut restaurants: Vec<String> = Vec::with_capacity(config.restaurants.len());
        for slug in config.restaurants {
            let slug = slug.trim();
            if !is_valid_slug(slug) {
                warn!(slug = %slug, "Ignoring invalid restaurant slug");
                continue;
            }
            if !restaurants.iter().any(|s| s == slug) {
                restaurants.push(slug.to_string());
            }
        }

        Self {
            source,
            interval: config.interval,
            pacing: config.pacing,
            tracked: restaurants,
            running: AtomicBool::new(false),
            active: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// 运行调度循环，直到 `stop` 被调用
    ///
    /// # 错误
    ///
    /// 调度器已在运行，或上一次的循环仍在完成当前周期时，返回 `WorkerError::AlreadyRunning`
    pub async fn start(&self) -> Result<(), WorkerError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(WorkerError::AlreadyRunning);
        }
        let _active = ActiveGuard(&self.active);
        self.running.store(true, Ordering::SeqCst);

        info!(
            interval_secs = self.interval.as_secs(),
            pacing_secs = self.pacing.as_secs(),
            "Ranking scheduler started"
        );

        loop {
            if !self.is_running() {
                break;
            }

            let started = Instant::now();
            let report = self.run_cycle().await;
            let elapsed = started.elapsed();
            metrics::gauge!("rankrs_scheduler_cycle_seconds").set(elapsed.as_secs_f64());
            info!(
                found = report.found,
                absent = report.absent,
                failed = report.failed,
                elapsed_secs = elapsed.as_secs_f64(),
                "Scheduler cycle finished"
            );

            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_running() {
                break;
            }

            let pause = remaining_interval(self.interval, elapsed);
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut notified => {}
            }
        }

        info!("Ranking scheduler stopped");
        Ok(())
    }

    /// 请求停止
    ///
    /// 正在等待下一周期时立即唤醒；正在解析时等当前周期结束后退出
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Ranking scheduler stop requested");
        }
        self.wake.notify_waiters();
    }

    /// 是否处于运行状态
    ///
    /// 收到停止请求后立即返回 `false`，即使当前周期还没有结束
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// 执行一个周期
    ///
    /// 按列表顺序依次解析，两次解析之间等待 `pacing`
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for (index, slug) in self.tracked.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let outcome = AssertUnwindSafe(self.source.resolve_ranking(slug))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(Some(snapshot))) => {
                    report.found += 1;
                    info!(slug = %slug, rank = snapshot.rank, rating = ?snapshot.rating, "Ranking recorded");
                }
                Ok(Ok(None)) => {
                    report.absent += 1;
                    warn!(slug = %slug, "Restaurant not found or currently closed");
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    error!(slug = %slug, error = %e, "Scheduler cycle error");
                }
                Err(_) => {
                    report.failed += 1;
                    error!(slug = %slug, "Scheduler cycle error: resolution panicked");
                }
            }
        }

        report
    }
}

#[async_trait]
impl Worker for RankingScheduler {
    async fn run(&self) -> Result<(), WorkerError> {
        self.start().await
    }

    fn name(&self) -> &str {
        "ranking_scheduler"
    }
}

/// 本周期结束后到下一周期开始前应等待的时间
///
/// 周期从开始时间计算，慢周期会缩短等待，但不会变为负数
pub fn remaining_interval(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}
