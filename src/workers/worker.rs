// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// 后台工作器
///
/// `run` 在工作器停止前不会返回，由调用方负责放到独立任务中执行
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行工作器直到停止
    async fn run(&self) -> Result<(), WorkerError>;

    /// 工作器名称，用于日志
    fn name(&self) -> &str;
}
