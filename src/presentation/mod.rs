// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 接口层模块
///
/// 提供排名查询的HTTP接口和命令行表格输出
pub mod errors;
pub mod handlers;
pub mod history_table;
pub mod routes;
