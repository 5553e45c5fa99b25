// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 重试策略配置
///
/// 线性放大：第n次尝试的等待时间为基础值的n倍，用于容忍首次加载较慢的页面。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// 创建线性重试策略
    pub fn linear(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// 计算第 `attempt` 次尝试（从1开始）的等待时间
    pub fn scaled(&self, base: Duration, attempt: u32) -> Duration {
        base.saturating_mul(attempt.max(1))
    }

    /// 已尝试 `attempt` 次后是否还应该继续
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
