// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供周期性排名采集的后台工作器
pub mod ranking_scheduler;
pub mod worker;

pub use ranking_scheduler::RankingScheduler;
pub use worker::Worker;
