// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含排名解析的核心模型、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 页面渲染抽象和基于Chromium的实现
pub mod engines;

/// 基础设施模块
///
/// 提供数据库和指标等外部服务集成
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 周期性排名采集
pub mod workers;
