// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：配送区域和排名快照
/// - 仓库接口（repositories）：排名历史的持久化抽象
/// - 服务（services）：地址解析、列表扫描和排名解析
///
/// 领域层只依赖渲染和持久化的抽象接口，不依赖具体实现。
pub mod models;
pub mod repositories;
pub mod services;
